//! Distinguished Encoding Rules (DER) codec.
//!
//! DER is BER restricted to definite lengths and primitive string forms,
//! with minimal length and integer octets, sorted `SET`/`SET OF` bodies
//! and mandatory omission of `DEFAULT` values. Every well-formed value has
//! exactly one DER encoding, which the decoder verifies byte by byte.

use crate::asn1::Value;
use crate::ber::{self, DecoderOptions, EncoderOptions, StreamDecoder};
use crate::Result;
use std::io::Read;

/// Encode `value` under DER.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    ber::encode_with(value, &EncoderOptions::der())
}

/// Decode one value from `bytes` without a schema, verifying DER
/// canonicality, returning the value and the unconsumed remainder.
pub fn decode(bytes: &[u8]) -> Result<(Value, &[u8])> {
    ber::decode_with_options(bytes, None, &DecoderOptions::der())
}

/// Decode one value of the type described by `schema` under DER.
pub fn decode_with<'a>(bytes: &'a [u8], schema: &Value) -> Result<(Value, &'a [u8])> {
    ber::decode_with_options(bytes, Some(schema), &DecoderOptions::der())
}

/// Strict variant of [`decode_with`]: trailing data is an error.
pub fn decode_exact(bytes: &[u8], schema: Option<&Value>) -> Result<Value> {
    ber::decode_exact(bytes, schema, &DecoderOptions::der())
}

/// Decode a stream of top-level values under DER.
pub fn decode_stream<R: Read>(reader: R, schema: Option<Value>) -> StreamDecoder<R> {
    StreamDecoder::new(reader, schema, DecoderOptions::der())
}
