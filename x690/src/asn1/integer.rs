//! ASN.1 `INTEGER` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, NamedValues, Result, Tag, TagSet};
use core::cmp::Ordering;
use core::ops::{Add, Mul, Neg, Sub};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// ASN.1 `INTEGER` value backed by an arbitrary-precision signed integer.
///
/// An optional named-value table binds symbolic names to specific numbers;
/// construction from a symbol resolves through it.
#[derive(Clone, Debug, PartialEq)]
pub struct Integer {
    tag_set: TagSet,
    constraints: ConstraintSet,
    named_values: Option<NamedValues>,
    inner: Option<BigInt>,
}

value_metadata!(Integer);

impl Integer {
    /// The `INTEGER` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::INTEGER),
            constraints: ConstraintSet::none(),
            named_values: None,
            inner: None,
        }
    }

    /// An `INTEGER` value.
    pub fn new(value: impl Into<BigInt>) -> Self {
        Self {
            inner: Some(value.into()),
            ..Self::schema()
        }
    }

    /// Schema with a named-value table.
    pub fn with_named_values(named_values: NamedValues) -> Self {
        Self {
            named_values: Some(named_values),
            ..Self::schema()
        }
    }

    /// Named-value table, if any.
    pub fn named_values(&self) -> Option<&NamedValues> {
        self.named_values.as_ref()
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&BigInt> {
        self.inner.as_ref().ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Payload narrowed to `i64`, when it fits.
    pub fn to_i64(&self) -> Result<i64> {
        self.value()?.to_i64().ok_or_else(|| ErrorKind::Overflow.into())
    }

    /// Symbolic name of the payload, resolved through the named-value table.
    pub fn symbol(&self) -> Result<Option<&str>> {
        let value = self.value()?;
        Ok(self.named_values.as_ref().and_then(|nv| nv.name_of(value)))
    }

    /// Sibling of this object holding `value`, checked against the
    /// constraints.
    pub fn with_value(&self, value: impl Into<BigInt>) -> Result<Self> {
        let v = Self {
            inner: Some(value.into()),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Sibling of this object holding the value bound to `symbol` in the
    /// named-value table.
    pub fn with_symbol(&self, symbol: &str) -> Result<Self> {
        let value = self
            .named_values
            .as_ref()
            .and_then(|nv| nv.value_of(symbol))
            .cloned()
            .ok_or(ErrorKind::ConstraintViolation {
                constraint: "named-value",
            })?;

        self.with_value(value)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        match &self.inner {
            Some(value) => self.constraints.check(&[Subject::Integer(value)]),
            None => Ok(()),
        }
    }

    fn binary_op(&self, other: &BigInt, op: impl FnOnce(&BigInt, &BigInt) -> BigInt) -> Integer {
        let inner = self.inner.as_ref().map(|v| op(v, other));
        Integer {
            inner,
            ..self.clone()
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Integer {
        Integer::new(value)
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Integer {
        Integer::new(value)
    }
}

impl Add<&Integer> for &Integer {
    type Output = Integer;

    fn add(self, other: &Integer) -> Integer {
        match &other.inner {
            Some(rhs) => self.binary_op(rhs, |a, b| a + b),
            None => Integer {
                inner: None,
                ..self.clone()
            },
        }
    }
}

impl Add<i64> for &Integer {
    type Output = Integer;

    fn add(self, other: i64) -> Integer {
        self.binary_op(&BigInt::from(other), |a, b| a + b)
    }
}

impl Sub<i64> for &Integer {
    type Output = Integer;

    fn sub(self, other: i64) -> Integer {
        self.binary_op(&BigInt::from(other), |a, b| a - b)
    }
}

impl Mul<i64> for &Integer {
    type Output = Integer;

    fn mul(self, other: i64) -> Integer {
        self.binary_op(&BigInt::from(other), |a, b| a * b)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        Integer {
            inner: self.inner.as_ref().map(|v| -v),
            ..self.clone()
        }
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|v| *v == BigInt::from(*other))
    }
}

impl PartialOrd<i64> for Integer {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.inner
            .as_ref()
            .map(|v| v.cmp(&BigInt::from(*other)))
    }
}

#[cfg(test)]
mod tests {
    use super::Integer;
    use crate::{Constraint, NamedValues, Tag};

    #[test]
    fn arithmetic_preserves_subtype() {
        let tagged = Integer::schema().subtype_implicit(Tag::context(2));
        let five = tagged.with_value(5).unwrap();
        let eight = &five + 3;

        assert_eq!(eight.to_i64().unwrap(), 8);
        assert_eq!(eight.tag_set(), tagged.tag_set());
    }

    #[test]
    fn comparison_with_literals() {
        let v = Integer::new(42);
        assert_eq!(v, 42);
        assert!(v > 41);
        assert!(v < 43);
    }

    #[test]
    fn constraints_checked_at_construction() {
        let bounded = Integer::schema()
            .constrained([Constraint::value_range(0, 9)])
            .unwrap();

        assert!(bounded.with_value(9).is_ok());
        assert!(bounded.with_value(10).is_err());
    }

    #[test]
    fn symbolic_construction() {
        let nv = NamedValues::new([("off", 0), ("on", 1)]).unwrap();
        let schema = Integer::with_named_values(nv);

        let on = schema.with_symbol("on").unwrap();
        assert_eq!(on.to_i64().unwrap(), 1);
        assert_eq!(on.symbol().unwrap(), Some("on"));
        assert!(schema.with_symbol("dimmed").is_err());
    }

    #[test]
    fn negation() {
        assert_eq!((-&Integer::new(7)).to_i64().unwrap(), -7);
    }
}
