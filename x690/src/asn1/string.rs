//! ASN.1 character-string support.
//!
//! One value type covers the character-string family; the [`StrKind`]
//! selects the universal tag and the fixed codec that maps payload
//! characters to content octets.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};

/// Member of the ASN.1 character-string family.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StrKind {
    /// `UTF8String` (UTF-8).
    Utf8,

    /// `NumericString` (US-ASCII).
    Numeric,

    /// `PrintableString` (US-ASCII).
    Printable,

    /// `TeletexString` / `T61String` (ISO-8859-1).
    Teletex,

    /// `VideotexString` (ISO-8859-1).
    Videotex,

    /// `IA5String` (US-ASCII).
    Ia5,

    /// `GraphicString` (ISO-8859-1).
    Graphic,

    /// `VisibleString` / `ISO646String` (US-ASCII).
    Visible,

    /// `GeneralString` (ISO-8859-1).
    General,

    /// `UniversalString` (UTF-32BE).
    UniversalStr,

    /// `BMPString` (UTF-16BE).
    Bmp,
}

/// Fixed octet codec of a string kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Codec {
    Ascii,
    Latin1,
    Utf8,
    Utf16Be,
    Utf32Be,
}

impl StrKind {
    /// Universal tag of this string kind.
    pub fn tag(self) -> Tag {
        match self {
            StrKind::Utf8 => Tag::UTF8_STRING,
            StrKind::Numeric => Tag::NUMERIC_STRING,
            StrKind::Printable => Tag::PRINTABLE_STRING,
            StrKind::Teletex => Tag::TELETEX_STRING,
            StrKind::Videotex => Tag::VIDEOTEX_STRING,
            StrKind::Ia5 => Tag::IA5_STRING,
            StrKind::Graphic => Tag::GRAPHIC_STRING,
            StrKind::Visible => Tag::VISIBLE_STRING,
            StrKind::General => Tag::GENERAL_STRING,
            StrKind::UniversalStr => Tag::UNIVERSAL_STRING,
            StrKind::Bmp => Tag::BMP_STRING,
        }
    }

    /// String kind for a universal tag, if it names one.
    pub(crate) fn for_tag(tag: Tag) -> Option<StrKind> {
        [
            StrKind::Utf8,
            StrKind::Numeric,
            StrKind::Printable,
            StrKind::Teletex,
            StrKind::Videotex,
            StrKind::Ia5,
            StrKind::Graphic,
            StrKind::Visible,
            StrKind::General,
            StrKind::UniversalStr,
            StrKind::Bmp,
        ]
        .into_iter()
        .find(|kind| kind.tag() == tag)
    }

    pub(crate) fn codec(self) -> Codec {
        match self {
            StrKind::Utf8 => Codec::Utf8,
            StrKind::Numeric | StrKind::Printable | StrKind::Ia5 | StrKind::Visible => Codec::Ascii,
            StrKind::Teletex | StrKind::Videotex | StrKind::Graphic | StrKind::General => {
                Codec::Latin1
            }
            StrKind::UniversalStr => Codec::Utf32Be,
            StrKind::Bmp => Codec::Utf16Be,
        }
    }
}

impl Codec {
    /// Decode content octets into characters.
    pub(crate) fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Codec::Ascii => {
                if !bytes.is_ascii() {
                    return Err(ErrorKind::CharacterSet.into());
                }
                // ASCII is a UTF-8 subset.
                String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::CharacterSet.into())
            }
            Codec::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Codec::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::CharacterSet.into())
            }
            Codec::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(ErrorKind::CharacterSet.into());
                }

                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).map_err(|_| ErrorKind::CharacterSet.into())
            }
            Codec::Utf32Be => {
                if bytes.len() % 4 != 0 {
                    return Err(ErrorKind::CharacterSet.into());
                }

                bytes
                    .chunks_exact(4)
                    .map(|quad| {
                        let code = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
                        char::from_u32(code).ok_or_else(|| ErrorKind::CharacterSet.into())
                    })
                    .collect()
            }
        }
    }

    /// Encode characters into content octets.
    pub(crate) fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Codec::Ascii => {
                if !text.is_ascii() {
                    return Err(ErrorKind::CharacterSet.into());
                }
                Ok(text.as_bytes().to_vec())
            }
            Codec::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| ErrorKind::CharacterSet.into())
                })
                .collect(),
            Codec::Utf8 => Ok(text.as_bytes().to_vec()),
            Codec::Utf16Be => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()),
            Codec::Utf32Be => Ok(text
                .chars()
                .flat_map(|c| u32::from(c).to_be_bytes())
                .collect()),
        }
    }
}

/// ASN.1 character-string value: a sequence of code points with a fixed
/// codec.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterString {
    kind: StrKind,
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<String>,
}

value_metadata!(CharacterString);

impl CharacterString {
    /// Schema for the given string kind.
    pub fn schema(kind: StrKind) -> Self {
        Self {
            kind,
            tag_set: TagSet::of(kind.tag()),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// `UTF8String` schema.
    pub fn utf8() -> Self {
        Self::schema(StrKind::Utf8)
    }

    /// `NumericString` schema.
    pub fn numeric() -> Self {
        Self::schema(StrKind::Numeric)
    }

    /// `PrintableString` schema.
    pub fn printable() -> Self {
        Self::schema(StrKind::Printable)
    }

    /// `IA5String` schema.
    pub fn ia5() -> Self {
        Self::schema(StrKind::Ia5)
    }

    /// `VisibleString` schema.
    pub fn visible() -> Self {
        Self::schema(StrKind::Visible)
    }

    /// `TeletexString` schema.
    pub fn teletex() -> Self {
        Self::schema(StrKind::Teletex)
    }

    /// `GeneralString` schema.
    pub fn general() -> Self {
        Self::schema(StrKind::General)
    }

    /// `UniversalString` schema.
    pub fn universal() -> Self {
        Self::schema(StrKind::UniversalStr)
    }

    /// `BMPString` schema.
    pub fn bmp() -> Self {
        Self::schema(StrKind::Bmp)
    }

    /// String kind of this value.
    pub fn kind(&self) -> StrKind {
        self.kind
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&str> {
        self.inner
            .as_deref()
            .ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Number of characters in the payload.
    pub fn len(&self) -> Result<usize> {
        Ok(self.value()?.chars().count())
    }

    /// Is the payload empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.value()?.is_empty())
    }

    /// Sibling of this object holding `text`; the text must be
    /// representable in the kind's codec and pass the constraints.
    pub fn with_value(&self, text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        // Validate representability eagerly so construction fails like any
        // other constraint violation would.
        self.kind.codec().encode(&text)?;

        let v = Self {
            inner: Some(text),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Content octets of the payload under the kind's codec.
    pub fn to_octets(&self) -> Result<Vec<u8>> {
        self.kind.codec().encode(self.value()?)
    }

    /// Sibling of this object decoded from content octets.
    pub(crate) fn with_octets(&self, bytes: &[u8]) -> Result<Self> {
        self.with_value(self.kind.codec().decode(bytes)?)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(text) => self.constraints.check(&[
                Subject::Text(text),
                Subject::Size(text.chars().count()),
            ]),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CharacterString, StrKind};
    use crate::{Constraint, Tag};

    #[test]
    fn kinds_carry_their_tags() {
        assert_eq!(CharacterString::utf8().tag_set().base_tag(), Some(Tag::UTF8_STRING));
        assert_eq!(CharacterString::ia5().tag_set().base_tag(), Some(Tag::IA5_STRING));
        assert_eq!(CharacterString::bmp().tag_set().base_tag(), Some(Tag::BMP_STRING));
    }

    #[test]
    fn ascii_kinds_reject_non_ascii() {
        assert!(CharacterString::printable().with_value("abc 123").is_ok());
        assert!(CharacterString::ia5().with_value("héllo").is_err());
    }

    #[test]
    fn bmp_round_trips_utf16() {
        let greeting = CharacterString::bmp().with_value("héllo").unwrap();
        let octets = greeting.to_octets().unwrap();
        assert_eq!(octets.len(), 10);

        let back = CharacterString::bmp().with_octets(&octets).unwrap();
        assert_eq!(back.value().unwrap(), "héllo");
    }

    #[test]
    fn universal_round_trips_utf32() {
        let s = CharacterString::universal().with_value("𝄞").unwrap();
        let octets = s.to_octets().unwrap();
        assert_eq!(octets.len(), 4);

        let back = CharacterString::universal().with_octets(&octets).unwrap();
        assert_eq!(back.value().unwrap(), "𝄞");
    }

    #[test]
    fn permitted_alphabet_applies() {
        let digits = CharacterString::numeric()
            .constrained([Constraint::permitted_alphabet("0123456789 ")])
            .unwrap();

        assert!(digits.with_value("123 456").is_ok());
        assert!(digits.with_value("12a").is_err());
    }

    #[test]
    fn kind_for_tag() {
        assert_eq!(StrKind::for_tag(Tag::VISIBLE_STRING), Some(StrKind::Visible));
        assert_eq!(StrKind::for_tag(Tag::INTEGER), None);
    }
}
