//! ASN.1 tags and tag sets.

mod class;
mod number;
mod set;

pub use self::{class::Class, number::TagNumber, set::TagSet};

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Encoding form of a tag: primitive or constructed.
///
/// The form carries an encoding hint (bit 6 of the identifier octet) and
/// never distinguishes types: two tags equal in class and number are the
/// same tag regardless of form.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Format {
    /// Primitive form: the body holds the value octets directly.
    Primitive = 0b0000_0000,

    /// Constructed form: the body holds nested TLV encodings.
    Constructed = 0b0010_0000,
}

impl Format {
    /// Mask covering the form bit of an identifier octet.
    pub(crate) const MASK: u8 = 0b0010_0000;

    /// Extract the form from the leading identifier octet.
    pub(crate) fn from_octet(octet: u8) -> Self {
        if octet & Self::MASK == 0 {
            Format::Primitive
        } else {
            Format::Constructed
        }
    }

    /// Form bit positioned for the leading identifier octet.
    pub fn octet(self) -> u8 {
        self as u8
    }
}

/// ASN.1 tag: a `(class, format, number)` triple identifying a type on the
/// wire.
///
/// Described in X.690 Section 8.1.2 (identifier octets). Tag identity for
/// comparison, ordering and hashing uses `(class, number)` only; the format
/// is an encoding hint.
#[derive(Copy, Clone, Debug, Eq)]
pub struct Tag {
    class: Class,
    format: Format,
    number: TagNumber,
}

impl Tag {
    /// `BOOLEAN` tag.
    pub const BOOLEAN: Tag = Tag::universal(1);

    /// `INTEGER` tag.
    pub const INTEGER: Tag = Tag::universal(2);

    /// `BIT STRING` tag.
    pub const BIT_STRING: Tag = Tag::universal(3);

    /// `OCTET STRING` tag.
    pub const OCTET_STRING: Tag = Tag::universal(4);

    /// `NULL` tag.
    pub const NULL: Tag = Tag::universal(5);

    /// `OBJECT IDENTIFIER` tag.
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(6);

    /// `REAL` tag.
    pub const REAL: Tag = Tag::universal(9);

    /// `ENUMERATED` tag.
    pub const ENUMERATED: Tag = Tag::universal(10);

    /// `UTF8String` tag.
    pub const UTF8_STRING: Tag = Tag::universal(12);

    /// `SEQUENCE` and `SEQUENCE OF` tag.
    pub const SEQUENCE: Tag = Tag::universal_constructed(16);

    /// `SET` and `SET OF` tag.
    pub const SET: Tag = Tag::universal_constructed(17);

    /// `NumericString` tag.
    pub const NUMERIC_STRING: Tag = Tag::universal(18);

    /// `PrintableString` tag.
    pub const PRINTABLE_STRING: Tag = Tag::universal(19);

    /// `TeletexString` tag.
    pub const TELETEX_STRING: Tag = Tag::universal(20);

    /// `VideotexString` tag.
    pub const VIDEOTEX_STRING: Tag = Tag::universal(21);

    /// `IA5String` tag.
    pub const IA5_STRING: Tag = Tag::universal(22);

    /// `UTCTime` tag.
    pub const UTC_TIME: Tag = Tag::universal(23);

    /// `GeneralizedTime` tag.
    pub const GENERALIZED_TIME: Tag = Tag::universal(24);

    /// `GraphicString` tag.
    pub const GRAPHIC_STRING: Tag = Tag::universal(25);

    /// `VisibleString` tag.
    pub const VISIBLE_STRING: Tag = Tag::universal(26);

    /// `GeneralString` tag.
    pub const GENERAL_STRING: Tag = Tag::universal(27);

    /// `UniversalString` tag.
    pub const UNIVERSAL_STRING: Tag = Tag::universal(28);

    /// `BMPString` tag.
    pub const BMP_STRING: Tag = Tag::universal(30);

    /// Create a new [`Tag`].
    pub const fn new(class: Class, format: Format, number: TagNumber) -> Self {
        Self {
            class,
            format,
            number,
        }
    }

    /// `UNIVERSAL` tag in primitive form (const-friendly).
    pub const fn universal(number: u32) -> Self {
        Self::new(Class::Universal, Format::Primitive, TagNumber::new(number))
    }

    /// `UNIVERSAL` tag in constructed form (const-friendly).
    pub const fn universal_constructed(number: u32) -> Self {
        Self::new(Class::Universal, Format::Constructed, TagNumber::new(number))
    }

    /// `APPLICATION` tag in primitive form.
    pub const fn application(number: u32) -> Self {
        Self::new(
            Class::Application,
            Format::Primitive,
            TagNumber::new(number),
        )
    }

    /// `CONTEXT-SPECIFIC` tag in primitive form.
    pub const fn context(number: u32) -> Self {
        Self::new(
            Class::ContextSpecific,
            Format::Primitive,
            TagNumber::new(number),
        )
    }

    /// `PRIVATE` tag in primitive form.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, Format::Primitive, TagNumber::new(number))
    }

    /// Get the [`Class`] of this tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Get the [`Format`] of this tag.
    pub const fn format(self) -> Format {
        self.format
    }

    /// Get the [`TagNumber`] of this tag.
    pub const fn number(self) -> TagNumber {
        self.number
    }

    /// Is this tag in constructed form?
    pub const fn is_constructed(self) -> bool {
        matches!(self.format, Format::Constructed)
    }

    /// Is this a `UNIVERSAL` class tag?
    pub const fn is_universal(self) -> bool {
        matches!(self.class, Class::Universal)
    }

    /// This tag with the form forced to constructed.
    pub const fn constructed(self) -> Self {
        Self::new(self.class, Format::Constructed, self.number)
    }

    /// This tag with the form forced to primitive.
    pub const fn primitive(self) -> Self {
        Self::new(self.class, Format::Primitive, self.number)
    }

    /// This tag with the given form.
    pub const fn with_format(self, format: Format) -> Self {
        Self::new(self.class, format, self.number)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.number == other.number
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class
            .cmp(&other.class)
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.number.hash(state);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_universal() {
            let name = match self.number.value() {
                1 => Some("BOOLEAN"),
                2 => Some("INTEGER"),
                3 => Some("BIT STRING"),
                4 => Some("OCTET STRING"),
                5 => Some("NULL"),
                6 => Some("OBJECT IDENTIFIER"),
                9 => Some("REAL"),
                10 => Some("ENUMERATED"),
                12 => Some("UTF8String"),
                16 => Some("SEQUENCE"),
                17 => Some("SET"),
                18 => Some("NumericString"),
                19 => Some("PrintableString"),
                20 => Some("TeletexString"),
                21 => Some("VideotexString"),
                22 => Some("IA5String"),
                23 => Some("UTCTime"),
                24 => Some("GeneralizedTime"),
                25 => Some("GraphicString"),
                26 => Some("VisibleString"),
                27 => Some("GeneralString"),
                28 => Some("UniversalString"),
                30 => Some("BMPString"),
                _ => None,
            };

            match name {
                Some(name) => f.write_str(name),
                None => write!(f, "UNIVERSAL {}", self.number),
            }
        } else {
            write!(f, "{} {}", self.class, self.number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Class, Format, Tag, TagNumber};

    #[test]
    fn identity_ignores_format() {
        assert_eq!(Tag::SEQUENCE, Tag::universal(16));
        assert_eq!(Tag::OCTET_STRING.constructed(), Tag::OCTET_STRING);
    }

    #[test]
    fn ordering_by_class_then_number() {
        assert!(Tag::INTEGER < Tag::OCTET_STRING);
        assert!(Tag::SET < Tag::application(0));
        assert!(Tag::application(7) < Tag::context(0));
        assert!(Tag::context(3) < Tag::private(0));
    }

    #[test]
    fn constructor_fields() {
        let tag = Tag::new(Class::ContextSpecific, Format::Constructed, TagNumber::new(2));
        assert_eq!(tag.class(), Class::ContextSpecific);
        assert_eq!(tag.format(), Format::Constructed);
        assert_eq!(tag.number().value(), 2);
        assert!(tag.is_constructed());
        assert!(!tag.is_universal());
    }

    #[test]
    fn display() {
        assert_eq!(Tag::INTEGER.to_string(), "INTEGER");
        assert_eq!(Tag::context(0).to_string(), "CONTEXT-SPECIFIC 0");
        assert_eq!(Tag::universal(99).to_string(), "UNIVERSAL 99");
    }
}
