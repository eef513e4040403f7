//! ASN.1 `REAL` support.

use crate::asn1::value_metadata;
use crate::{ConstraintSet, ErrorKind, Result, Tag, TagSet};
use core::cmp::Ordering;
use core::ops::{Add, Div, Mul, Sub};

/// Payload of a `REAL` value.
///
/// Finite values are `(mantissa, base, exponent)` with base 2 or 10; the
/// special values of X.690 Section 8.5.9 are carried as their own variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RealValue {
    /// `mantissa × base ^ exponent`.
    Finite {
        /// Signed mantissa.
        mantissa: i64,

        /// Base, 2 or 10.
        base: u8,

        /// Signed exponent.
        exponent: i32,
    },

    /// Positive or negative infinity.
    Infinity {
        /// Sign of the infinity.
        negative: bool,
    },

    /// Minus zero.
    MinusZero,

    /// Not a number.
    NotANumber,
}

impl RealValue {
    /// Approximate this payload as an `f64`.
    pub fn to_f64(self) -> f64 {
        match self {
            RealValue::Finite {
                mantissa,
                base,
                exponent,
            } => mantissa as f64 * f64::from(base).powi(exponent),
            RealValue::Infinity { negative: false } => f64::INFINITY,
            RealValue::Infinity { negative: true } => f64::NEG_INFINITY,
            RealValue::MinusZero => -0.0,
            RealValue::NotANumber => f64::NAN,
        }
    }

    /// Decompose an `f64` into a payload (base 2 for finite values).
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return RealValue::NotANumber;
        }

        if value.is_infinite() {
            return RealValue::Infinity {
                negative: value.is_sign_negative(),
            };
        }

        if value == 0.0 {
            return if value.is_sign_negative() {
                RealValue::MinusZero
            } else {
                RealValue::Finite {
                    mantissa: 0,
                    base: 2,
                    exponent: 0,
                }
            };
        }

        let (mut mantissa, mut exponent) = (value, 0i32);

        while mantissa.fract() != 0.0 && exponent > -1074 {
            mantissa *= 2.0;
            exponent -= 1;
        }

        while mantissa.abs() >= 9.007_199_254_740_992e15 {
            mantissa /= 2.0;
            exponent += 1;
        }

        RealValue::Finite {
            mantissa: mantissa as i64,
            base: 2,
            exponent,
        }
    }

    /// Is this payload zero (of either sign)?
    pub fn is_zero(self) -> bool {
        matches!(
            self,
            RealValue::MinusZero | RealValue::Finite { mantissa: 0, .. }
        )
    }
}

/// ASN.1 `REAL` value.
///
/// Arithmetic routes through `f64`, so the infinities behave as absorbing
/// values the way IEEE 754 defines them.
#[derive(Clone, Debug, PartialEq)]
pub struct Real {
    tag_set: TagSet,
    constraints: ConstraintSet,
    inner: Option<RealValue>,
}

value_metadata!(Real);

impl Real {
    /// The `REAL` schema: no value.
    pub fn schema() -> Self {
        Self {
            tag_set: TagSet::of(Tag::REAL),
            constraints: ConstraintSet::none(),
            inner: None,
        }
    }

    /// A finite `REAL` value `mantissa × base ^ exponent`; base must be
    /// 2 or 10.
    pub fn new(mantissa: i64, base: u8, exponent: i32) -> Result<Self> {
        if base != 2 && base != 10 {
            return Err(ErrorKind::Value { tag: Tag::REAL }.into());
        }

        Ok(Self {
            inner: Some(RealValue::Finite {
                mantissa,
                base,
                exponent,
            }),
            ..Self::schema()
        })
    }

    /// A `REAL` value from an `f64`.
    pub fn from_f64(value: f64) -> Self {
        Self {
            inner: Some(RealValue::from_f64(value)),
            ..Self::schema()
        }
    }

    /// Positive or negative infinity.
    pub fn infinity(negative: bool) -> Self {
        Self {
            inner: Some(RealValue::Infinity { negative }),
            ..Self::schema()
        }
    }

    /// The not-a-number value.
    pub fn nan() -> Self {
        Self {
            inner: Some(RealValue::NotANumber),
            ..Self::schema()
        }
    }

    /// Get the payload.
    pub fn value(&self) -> Result<RealValue> {
        self.inner.ok_or_else(|| ErrorKind::NoValue.into())
    }

    /// Approximate the payload as an `f64`.
    pub fn to_f64(&self) -> Result<f64> {
        Ok(self.value()?.to_f64())
    }

    /// Sibling of this object holding `value`.
    pub fn with_value(&self, value: RealValue) -> Result<Self> {
        let v = Self {
            inner: Some(value),
            ..self.clone()
        };
        v.check_constraints()?;
        Ok(v)
    }

    pub(crate) fn check_constraints(&self) -> Result<()> {
        Ok(())
    }

    fn float_op(&self, other: &Real, op: impl FnOnce(f64, f64) -> f64) -> Real {
        let inner = match (self.inner, other.inner) {
            (Some(a), Some(b)) => Some(RealValue::from_f64(op(a.to_f64(), b.to_f64()))),
            _ => None,
        };

        Real {
            inner,
            ..self.clone()
        }
    }
}

impl Add<&Real> for &Real {
    type Output = Real;

    fn add(self, other: &Real) -> Real {
        self.float_op(other, |a, b| a + b)
    }
}

impl Sub<&Real> for &Real {
    type Output = Real;

    fn sub(self, other: &Real) -> Real {
        self.float_op(other, |a, b| a - b)
    }
}

impl Mul<&Real> for &Real {
    type Output = Real;

    fn mul(self, other: &Real) -> Real {
        self.float_op(other, |a, b| a * b)
    }
}

impl Div<&Real> for &Real {
    type Output = Real;

    fn div(self, other: &Real) -> Real {
        self.float_op(other, |a, b| a / b)
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.inner, other.inner) {
            (Some(a), Some(b)) => a.to_f64().partial_cmp(&b.to_f64()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Real, RealValue};

    #[test]
    fn finite_round_trip_through_f64() {
        let half = Real::from_f64(0.5);
        assert_eq!(
            half.value().unwrap(),
            RealValue::Finite {
                mantissa: 1,
                base: 2,
                exponent: -1
            }
        );
        assert_eq!(half.to_f64().unwrap(), 0.5);
    }

    #[test]
    fn base_validity() {
        assert!(Real::new(1, 2, 0).is_ok());
        assert!(Real::new(1, 10, 0).is_ok());
        assert!(Real::new(1, 8, 0).is_err());
    }

    #[test]
    fn infinities_absorb() {
        let inf = Real::infinity(false);
        let one = Real::from_f64(1.0);

        assert_eq!((&inf + &one).to_f64().unwrap(), f64::INFINITY);
        assert_eq!((&one - &inf).to_f64().unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn minus_zero_and_nan() {
        assert_eq!(Real::from_f64(-0.0).value().unwrap(), RealValue::MinusZero);
        assert!(Real::nan().to_f64().unwrap().is_nan());
    }

    #[test]
    fn ordering() {
        assert!(Real::from_f64(1.5) < Real::from_f64(2.0));
        assert!(Real::nan().partial_cmp(&Real::from_f64(0.0)).is_none());
    }
}
