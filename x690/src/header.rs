//! TLV headers.

use crate::{EncodedLength, Tag};

/// Header of a TLV encoding: the tag and length components.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// Tag identifying the type of the encoded value.
    pub tag: Tag,

    /// Length of the encoded value body.
    pub length: EncodedLength,
}

impl Header {
    /// Create a new [`Header`].
    pub fn new(tag: Tag, length: EncodedLength) -> Self {
        Self { tag, length }
    }
}
