//! Canonical Encoding Rules (CER) codec.
//!
//! CER is BER restricted to one encoding per value: constructed encodings
//! use the indefinite form, string values longer than 1000 use the chunked
//! constructed form, `SET` components sort by tag and `SET OF` elements by
//! their encodings.

use crate::asn1::Value;
use crate::ber::{self, DecoderOptions, EncoderOptions, StreamDecoder};
use crate::Result;
use std::io::Read;

/// Encode `value` under CER.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    ber::encode_with(value, &EncoderOptions::cer())
}

/// Decode one value from `bytes` without a schema, verifying CER
/// canonicality, returning the value and the unconsumed remainder.
pub fn decode(bytes: &[u8]) -> Result<(Value, &[u8])> {
    ber::decode_with_options(bytes, None, &DecoderOptions::cer())
}

/// Decode one value of the type described by `schema` under CER.
pub fn decode_with<'a>(bytes: &'a [u8], schema: &Value) -> Result<(Value, &'a [u8])> {
    ber::decode_with_options(bytes, Some(schema), &DecoderOptions::cer())
}

/// Strict variant of [`decode_with`]: trailing data is an error.
pub fn decode_exact(bytes: &[u8], schema: Option<&Value>) -> Result<Value> {
    ber::decode_exact(bytes, schema, &DecoderOptions::cer())
}

/// Decode a stream of top-level values under CER.
pub fn decode_stream<R: Read>(reader: R, schema: Option<Value>) -> StreamDecoder<R> {
    StreamDecoder::new(reader, schema, DecoderOptions::cer())
}
