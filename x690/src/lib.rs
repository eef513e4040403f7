//! Pure Rust implementation of the ASN.1 Basic, Canonical and Distinguished
//! Encoding Rules (BER/CER/DER) as described in ITU [X.690].
//!
//! # About
//!
//! This crate pairs a runtime, schema-aware model of ASN.1 values — tags,
//! tag sets, constraints and named component tables — with three codec
//! families translating between that model and octet streams.
//!
//! A value object with no payload *is* the schema for its type: build one
//! from the type constructors, derive subtypes by tagging or constraining
//! it, and hand it to the decoder to drive schema-aware decoding. Without a
//! schema the decoders produce values typed by their wire tags.
//!
//! ```
//! use x690::asn1::{Integer, Value};
//! use x690::der;
//!
//! # fn main() -> x690::Result<()> {
//! let answer = Value::Integer(Integer::new(42));
//! let wire = der::encode(&answer)?;
//! assert_eq!(wire, [0x02, 0x01, 0x2A]);
//!
//! let (decoded, rest) = der::decode_with(&wire, &Value::Integer(Integer::schema()))?;
//! assert_eq!(decoded, answer);
//! assert!(rest.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! Decoding from a short substrate fails with a resumable
//! [`ErrorKind::Incomplete`]; [`ber::StreamDecoder`] builds the pull loop
//! around it for synchronous streams.
//!
//! Diagnostics are emitted through [`tracing`]; install any subscriber to
//! observe the codecs at work.
//!
//! [X.690]: https://www.itu.int/rec/T-REC-X.690/

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod asn1;
pub mod ber;
pub mod cer;
pub mod constraint;
pub mod der;
mod error;
mod header;
mod length;
pub mod namedtype;
mod namedval;
mod opentype;
mod tag;

pub use crate::{
    asn1::Value,
    constraint::{Constraint, ConstraintSet},
    error::{Error, ErrorKind, Result},
    header::Header,
    length::{EncodedLength, Length},
    namedtype::{ComponentKind, NamedType, NamedTypes},
    namedval::NamedValues,
    opentype::OpenType,
    tag::{Class, Format, Tag, TagNumber, TagSet},
};
