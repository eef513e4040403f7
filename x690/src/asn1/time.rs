//! ASN.1 time-string support: `UTCTime` and `GeneralizedTime`.
//!
//! Time strings are visible strings with a syntactic contract. The lenient
//! grammar (BER) admits optional seconds and numeric zone offsets; the
//! canonical form required by CER and DER mandates seconds and the `Z`
//! zone designator, and forbids trailing zeroes in a `GeneralizedTime`
//! fraction.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};

/// ASN.1 `UTCTime` value: `YYMMDDHHMM[SS][Z|±hhmm]`.
#[derive(Clone, Debug, PartialEq)]
pub struct UtcTime {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<String>,
}

value_metadata!(UtcTime);

impl UtcTime {
    /// The `UTCTime` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::UTC_TIME),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// A `UTCTime` value, validated against the lenient grammar.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        Self::schema().with_value(text)
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&str> {
        self.inner
            .as_deref()
            .ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Sibling of this object holding `text`, validated.
    pub fn with_value(&self, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        validate_utc(&text)?;

        let v = Self {
            inner: Some(text),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Does the payload satisfy the canonical (CER/DER) form:
    /// seconds present and `Z` zone?
    pub fn is_canonical(&self) -> Result<bool> {
        Ok(is_canonical_utc(self.value()?))
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(text) => self.constraints.check(&[
                Subject::Text(text),
                Subject::Size(text.len()),
            ]),
            None => Ok(()),
        }
    }
}

/// ASN.1 `GeneralizedTime` value: `YYYYMMDDHHMMSS[.fff][Z|±hhmm]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneralizedTime {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<String>,
}

value_metadata!(GeneralizedTime);

impl GeneralizedTime {
    /// The `GeneralizedTime` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::GENERALIZED_TIME),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// A `GeneralizedTime` value, validated against the lenient grammar.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        Self::schema().with_value(text)
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&str> {
        self.inner
            .as_deref()
            .ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Sibling of this object holding `text`, validated.
    pub fn with_value(&self, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        validate_generalized(&text)?;

        let v = Self {
            inner: Some(text),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Does the payload satisfy the canonical (CER/DER) form: seconds
    /// present, no trailing fraction zero, `Z` zone?
    pub fn is_canonical(&self) -> Result<bool> {
        Ok(is_canonical_generalized(self.value()?))
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(text) => self.constraints.check(&[
                Subject::Text(text),
                Subject::Size(text.len()),
            ]),
            None => Ok(()),
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing zone designator: `Z` or `±hhmm`.
fn split_zone(s: &str) -> Option<(&str, &str)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, "Z"));
    }

    if s.len() >= 5 {
        let (body, zone) = s.split_at(s.len() - 5);
        if (zone.starts_with('+') || zone.starts_with('-')) && all_digits(&zone[1..]) {
            return Some((body, zone));
        }
    }

    None
}

fn validate_utc(text: &str) -> Result<()> {
    let malformed = || ErrorKind::Value { tag: Tag::UTC_TIME };

    let (body, _zone) = split_zone(text).unwrap_or((text, ""));

    // YYMMDDHHMM with optional SS.
    if !(body.len() == 10 || body.len() == 12) || !all_digits(body) {
        return Err(malformed().into());
    }

    Ok(())
}

fn is_canonical_utc(text: &str) -> bool {
    text.len() == 13 && text.ends_with('Z') && all_digits(&text[..12])
}

fn validate_generalized(text: &str) -> Result<()> {
    let malformed = || ErrorKind::Value {
        tag: Tag::GENERALIZED_TIME,
    };

    let (body, _zone) = split_zone(text).unwrap_or((text, ""));

    let (whole, fraction) = match body.split_once(|c| c == '.' || c == ',') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };

    // YYYYMMDDHH with optional MM and SS.
    if !(whole.len() == 10 || whole.len() == 12 || whole.len() == 14) || !all_digits(whole) {
        return Err(malformed().into());
    }

    if let Some(fraction) = fraction {
        if !all_digits(fraction) {
            return Err(malformed().into());
        }
    }

    Ok(())
}

fn is_canonical_generalized(text: &str) -> bool {
    let Some(body) = text.strip_suffix('Z') else {
        return false;
    };

    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => {
            // A comma separator is never canonical.
            if body.contains(',') {
                return false;
            }
            (body, None)
        }
    };

    if whole.len() != 14 || !all_digits(whole) {
        return false;
    }

    match fraction {
        Some(fraction) => all_digits(fraction) && !fraction.ends_with('0'),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{GeneralizedTime, UtcTime};

    #[test]
    fn utc_grammar() {
        assert!(UtcTime::new("170801120112Z").is_ok());
        assert!(UtcTime::new("1708011201Z").is_ok());
        assert!(UtcTime::new("170801120112+0200").is_ok());
        assert!(UtcTime::new("17080112011Z").is_err());
        assert!(UtcTime::new("not a time").is_err());
    }

    #[test]
    fn utc_canonical_form() {
        assert!(UtcTime::new("170801120112Z").unwrap().is_canonical().unwrap());
        assert!(!UtcTime::new("1708011201Z").unwrap().is_canonical().unwrap());
        assert!(!UtcTime::new("170801120112+0200")
            .unwrap()
            .is_canonical()
            .unwrap());
    }

    #[test]
    fn generalized_grammar() {
        assert!(GeneralizedTime::new("20170801120112Z").is_ok());
        assert!(GeneralizedTime::new("20170801120112.25Z").is_ok());
        assert!(GeneralizedTime::new("2017080112").is_ok());
        assert!(GeneralizedTime::new("20170801120112-0330").is_ok());
        assert!(GeneralizedTime::new("201708011201123").is_err());
    }

    #[test]
    fn generalized_canonical_form() {
        assert!(GeneralizedTime::new("20170801120112Z")
            .unwrap()
            .is_canonical()
            .unwrap());
        assert!(GeneralizedTime::new("20170801120112.25Z")
            .unwrap()
            .is_canonical()
            .unwrap());
        // Trailing fraction zero.
        assert!(!GeneralizedTime::new("20170801120112.250Z")
            .unwrap()
            .is_canonical()
            .unwrap());
        // Missing seconds.
        assert!(!GeneralizedTime::new("201708011201Z")
            .unwrap()
            .is_canonical()
            .unwrap());
        // Offset zone.
        assert!(!GeneralizedTime::new("20170801120112+0100")
            .unwrap()
            .is_canonical()
            .unwrap());
    }
}
