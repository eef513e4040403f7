//! Basic Encoding Rules (BER) codec.
//!
//! The BER codec hosts the shared implementation for all three dialects:
//! [`cer`][crate::cer] and [`der`][crate::der] are configurations of the
//! decoder and encoder defined here, each adding its canonical checks.

mod decoder;
mod encoder;
mod stream;

pub use self::decoder::{
    decode, decode_exact, decode_with, decode_with_options, Decoder, DecoderOptions,
};
pub use self::encoder::{encode, encode_with, Encoder, EncoderOptions};
pub use self::stream::{decode_stream, StreamDecoder};

/// The X.690 encoding-rule dialects.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EncodingRules {
    /// Basic Encoding Rules.
    Ber,

    /// Canonical Encoding Rules.
    Cer,

    /// Distinguished Encoding Rules.
    Der,
}

impl EncodingRules {
    /// Do these rules demand a canonical encoding (CER or DER)?
    pub fn is_canonical(self) -> bool {
        matches!(self, EncodingRules::Cer | EncodingRules::Der)
    }

    /// Are these the Distinguished Encoding Rules?
    pub fn is_der(self) -> bool {
        matches!(self, EncodingRules::Der)
    }
}
