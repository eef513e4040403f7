//! ASN.1 `OBJECT IDENTIFIER` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};
use core::fmt;
use core::str::FromStr;

/// ASN.1 `OBJECT IDENTIFIER` value: a tuple of non-negative arcs.
///
/// The first arc must be 0, 1 or 2 and the second must be at most 39 when
/// the first is below 2; violations are a schema error at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectIdentifier {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<Vec<u64>>,
}

value_metadata!(ObjectIdentifier);

impl ObjectIdentifier {
    /// The `OBJECT IDENTIFIER` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::OBJECT_IDENTIFIER),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// An `OBJECT IDENTIFIER` value from its arcs.
    pub fn new(arcs: impl Into<Vec<u64>>) -> Result<Self> {
        Self::schema().with_arcs(arcs)
    }

    /// Get the arcs.
    pub fn arcs(&self) -> Result<&[u64]> {
        self.inner
            .as_deref()
            .ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Number of arcs.
    pub fn len(&self) -> Result<usize> {
        Ok(self.arcs()?.len())
    }

    /// Is the arc list empty?
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.arcs()?.is_empty())
    }

    /// Is this identifier a prefix of `other`?
    pub fn is_prefix_of(&self, other: &ObjectIdentifier) -> Result<bool> {
        let prefix = self.arcs()?;
        let arcs = other.arcs()?;
        Ok(arcs.len() > prefix.len() && arcs.starts_with(prefix))
    }

    /// Sibling of this object holding the given arcs, validated.
    pub fn with_arcs(&self, arcs: impl Into<Vec<u64>>) -> Result<Self> {
        let arcs = arcs.into();
        validate(&arcs)?;

        let v = Self {
            inner: Some(arcs),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(arcs) => self.constraints.check(&[Subject::Size(arcs.len())]),
            None => Ok(()),
        }
    }
}

/// Arc validity per X.660: first ∈ {0, 1, 2}, second ≤ 39 when first < 2.
fn validate(arcs: &[u64]) -> Result<()> {
    if arcs.is_empty() {
        return Err(ErrorKind::OidMalformed.into());
    }

    if arcs[0] > 2 {
        return Err(ErrorKind::OidMalformed.into());
    }

    if arcs[0] < 2 {
        if let Some(&second) = arcs.get(1) {
            if second > 39 {
                return Err(ErrorKind::OidMalformed.into());
            }
        }
    }

    Ok(())
}

impl FromStr for ObjectIdentifier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let arcs = s
            .split('.')
            .map(|arc| arc.parse::<u64>().map_err(|_| ErrorKind::OidMalformed.into()))
            .collect::<Result<Vec<u64>>>()?;

        Self::new(arcs)
    }
}

impl TryFrom<&str> for ObjectIdentifier {
    type Error = crate::Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(arcs) => {
                for (i, arc) in arcs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", arc)?;
                }
                Ok(())
            }
            None => f.write_str("OBJECT IDENTIFIER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectIdentifier;

    #[test]
    fn dotted_initialiser() {
        let oid: ObjectIdentifier = "1.3.6.1.2".parse().unwrap();
        assert_eq!(oid.arcs().unwrap(), [1, 3, 6, 1, 2]);
        assert_eq!(oid.to_string(), "1.3.6.1.2");
    }

    #[test]
    fn first_arc_bounded() {
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 999]).is_ok());
    }

    #[test]
    fn second_arc_bounded_under_small_roots() {
        assert!(ObjectIdentifier::new(vec![0, 39]).is_ok());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
    }

    #[test]
    fn empty_rejected() {
        assert!(ObjectIdentifier::new(Vec::new()).is_err());
    }

    #[test]
    fn prefix_relation() {
        let root: ObjectIdentifier = "1.3.6".parse().unwrap();
        let leaf: ObjectIdentifier = "1.3.6.1.4.1".parse().unwrap();

        assert!(root.is_prefix_of(&leaf).unwrap());
        assert!(!leaf.is_prefix_of(&root).unwrap());
        assert!(!root.is_prefix_of(&root).unwrap());
    }
}
