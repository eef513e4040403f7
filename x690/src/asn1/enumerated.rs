//! ASN.1 `ENUMERATED` support.

use crate::asn1::value_metadata;
use crate::constraint::Subject;
use crate::{ConstraintSet, ErrorKind, NamedValues, Result, Tag, TagSet};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// ASN.1 `ENUMERATED` value.
///
/// Integer semantics under its own universal tag. A payload must be bound in
/// the enumeration's named-value table.
#[derive(Clone, Debug, PartialEq)]
pub struct Enumerated {
    tag_set: TagSet,
    constraints: ConstraintSet,
    named_values: NamedValues,
    inner: Option<BigInt>,
}

value_metadata!(Enumerated);

impl Enumerated {
    /// The `ENUMERATED` schema over the given enumeration table.
    pub fn schema(named_values: NamedValues) -> Self {
        Self {
            tag_set: TagSet::of(Tag::ENUMERATED),
            constraints: ConstraintSet::none(),
            named_values,
            inner: None,
        }
    }

    /// The enumeration table.
    pub fn named_values(&self) -> &NamedValues {
        &self.named_values
    }

    /// Get the payload.
    pub fn value(&self) -> Result<&BigInt> {
        self.inner.as_ref().ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Payload narrowed to `i64`, when it fits.
    pub fn to_i64(&self) -> Result<i64> {
        self.value()?.to_i64().ok_or_else(|| ErrorKind::Overflow.into())
    }

    /// Symbolic name of the payload.
    pub fn symbol(&self) -> Result<&str> {
        let value = self.value()?;
        self.named_values
            .name_of(value)
            .ok_or_else(|| {
                ErrorKind::ConstraintViolation {
                    constraint: "enumeration",
                }
                .into()
            })
    }

    /// Sibling of this object holding `value`; the value must be bound in
    /// the enumeration table.
    pub fn with_value(&self, value: impl Into<BigInt>) -> Result<Self> {
        let v = Self {
            inner: Some(value.into()),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    /// Sibling of this object holding the value named `symbol`.
    pub fn with_symbol(&self, symbol: &str) -> Result<Self> {
        let value = self
            .named_values
            .value_of(symbol)
            .cloned()
            .ok_or(ErrorKind::ConstraintViolation {
                constraint: "enumeration",
            })?;

        self.with_value(value)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        let Some(value) = &self.inner else {
            return Ok(());
        };

        // An empty enumeration table (schemaless decoding) enumerates
        // nothing and constrains nothing.
        if !self.named_values.is_empty() && !self.named_values.contains_value(value) {
            return Err(ErrorKind::ConstraintViolation {
                constraint: "enumeration",
            }
            .into());
        }

        self.constraints.check(&[Subject::Integer(value)])
    }
}
