//! Streaming decode over a synchronous pull stream.
//!
//! The slice decoder signals a resumable underrun
//! ([`ErrorKind::Incomplete`]) when the substrate runs short. The stream
//! decoder turns that into a pull loop: buffer what the source has
//! produced, retry the decode when more arrives, and yield each completed
//! top-level value.

use crate::asn1::Value;
use crate::ber::decoder::{decode_with_options, DecoderOptions};
use crate::{ErrorKind, Result};
use std::io::Read;

const READ_CHUNK: usize = 4096;

/// Decode a stream of top-level values from `reader`.
///
/// With a schema, every value decodes against it; without one, values are
/// typed by their wire tags.
pub fn decode_stream<R: Read>(reader: R, schema: Option<Value>) -> StreamDecoder<R> {
    StreamDecoder::new(reader, schema, DecoderOptions::ber())
}

/// Iterator of values decoded from a byte stream.
#[derive(Debug)]
pub struct StreamDecoder<R> {
    reader: R,
    schema: Option<Value>,
    options: DecoderOptions,
    buf: Vec<u8>,
    consumed: usize,
    eof: bool,
    failed: bool,
}

impl<R: Read> StreamDecoder<R> {
    /// Create a stream decoder with explicit [`DecoderOptions`].
    pub fn new(reader: R, schema: Option<Value>, options: DecoderOptions) -> Self {
        Self {
            reader,
            schema,
            options,
            buf: Vec::new(),
            consumed: 0,
            eof: false,
            failed: false,
        }
    }

    /// Pull at least `needed` more bytes from the source, or learn that it
    /// is exhausted.
    fn fill(&mut self, needed: usize) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut got = 0;

        while got < needed && !self.eof {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    got += n;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(ErrorKind::Io {
                        message: e.to_string(),
                    }
                    .into())
                }
            }
        }

        Ok(())
    }

    /// Drop already-consumed bytes once they accumulate.
    fn compact(&mut self) {
        if self.consumed >= READ_CHUNK {
            self.buf.drain(..self.consumed);
            self.consumed = 0;
        }
    }
}

impl<R: Read> Iterator for StreamDecoder<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if self.consumed == self.buf.len() {
                if self.eof {
                    return None;
                }

                if let Err(e) = self.fill(1) {
                    self.failed = true;
                    return Some(Err(e));
                }
                continue;
            }

            let pending = &self.buf[self.consumed..];

            match decode_with_options(pending, self.schema.as_ref(), &self.options) {
                Ok((value, rest)) => {
                    self.consumed = self.buf.len() - rest.len();
                    self.compact();
                    return Some(Ok(value));
                }
                Err(e) if e.is_incomplete() && !self.eof => {
                    // Resumable underrun: pull at least the missing byte
                    // count and retry from the saved position.
                    let needed = match e.kind() {
                        ErrorKind::Incomplete { needed: Some(n) } => n.get(),
                        _ => 1,
                    };

                    if let Err(e) = self.fill(needed) {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode_stream;
    use crate::asn1::{Integer, Value};
    use hex_literal::hex;

    /// Reader yielding one byte per read call, the worst case for
    /// resumption.
    struct Trickle<'a>(&'a [u8]);

    impl std::io::Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.split_first() {
                Some((&byte, rest)) => {
                    buf[0] = byte;
                    self.0 = rest;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn values_stream_out_one_by_one() {
        let wire = hex!("02 01 01 02 01 02 02 01 03");
        let values: Vec<_> = decode_stream(&wire[..], None)
            .collect::<crate::Result<_>>()
            .unwrap();

        assert_eq!(values.len(), 3);
        let Value::Integer(third) = &values[2] else {
            panic!("expected INTEGER");
        };
        assert_eq!(third.to_i64().unwrap(), 3);
    }

    #[test]
    fn trickled_input_resumes_until_complete() {
        let wire = hex!("02 02 01 00 05 00");
        let values: Vec<_> = decode_stream(Trickle(&wire), None)
            .collect::<crate::Result<_>>()
            .unwrap();

        assert_eq!(values.len(), 2);
        let Value::Integer(first) = &values[0] else {
            panic!("expected INTEGER");
        };
        assert_eq!(first.to_i64().unwrap(), 256);
    }

    #[test]
    fn truncated_stream_surfaces_underrun() {
        let wire = hex!("02 05 01");
        let mut stream = decode_stream(&wire[..], None);

        let err = stream.next().unwrap().unwrap_err();
        assert!(err.is_incomplete());
        assert!(stream.next().is_none());
    }

    #[test]
    fn schema_applies_to_every_value() {
        let wire = hex!("02 01 2A 02 01 2B");
        let schema = Value::Integer(Integer::schema());

        let values: Vec<_> = decode_stream(&wire[..], Some(schema))
            .collect::<crate::Result<_>>()
            .unwrap();
        assert_eq!(values.len(), 2);
    }
}
