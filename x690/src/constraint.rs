//! Value constraints.
//!
//! Constraints are predicates over values, evaluated at value construction,
//! decode and encode time. They compose by value: intersection runs each
//! member in order and short-circuits on failure, union succeeds when any
//! member succeeds, exclusion inverts its member. Membership queries use
//! structural equality, which makes subtype relations between constrained
//! types decidable.

use crate::{ErrorKind, Result};
use num_bigint::BigInt;
use std::collections::BTreeSet;

/// View of a value payload for constraint evaluation.
///
/// Each value type exposes the facets a constraint can observe: its numeric
/// payload, its length, its character content.
#[derive(Copy, Clone, Debug)]
pub enum Subject<'a> {
    /// Numeric payload (`INTEGER`, `ENUMERATED`).
    Integer(&'a BigInt),

    /// Element or octet or character count of the payload.
    Size(usize),

    /// Character payload of a string type.
    Text(&'a str),
}

/// A single constraint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// Membership in a fixed set of permitted values.
    SingleValue {
        /// Permitted values.
        values: Vec<BigInt>,
    },

    /// Inclusive numeric range; open ends permitted.
    ValueRange {
        /// Lower bound, inclusive.
        min: Option<BigInt>,

        /// Upper bound, inclusive.
        max: Option<BigInt>,
    },

    /// Inclusive range on `len(value)`.
    SizeRange {
        /// Lower bound, inclusive.
        min: usize,

        /// Upper bound, inclusive; open when `None`.
        max: Option<usize>,
    },

    /// Permitted character alphabet for string types.
    PermittedAlphabet {
        /// The allowed characters.
        alphabet: BTreeSet<char>,
    },

    /// All member constraints must hold; evaluation short-circuits on the
    /// first failure.
    Intersection {
        /// Member constraints, evaluated in order.
        constraints: Vec<Constraint>,
    },

    /// At least one member constraint must hold.
    Union {
        /// Member constraints, evaluated in order.
        constraints: Vec<Constraint>,
    },

    /// The member constraint must not hold.
    Exclusion {
        /// Excluded constraint.
        constraint: Box<Constraint>,
    },
}

impl Constraint {
    /// Single-value constraint over integer literals.
    pub fn single_value<I: IntoIterator<Item = i64>>(values: I) -> Self {
        Constraint::SingleValue {
            values: values.into_iter().map(BigInt::from).collect(),
        }
    }

    /// Inclusive value range over integer literals.
    pub fn value_range(min: i64, max: i64) -> Self {
        Constraint::ValueRange {
            min: Some(BigInt::from(min)),
            max: Some(BigInt::from(max)),
        }
    }

    /// Inclusive size range.
    pub fn size_range(min: usize, max: usize) -> Self {
        Constraint::SizeRange {
            min,
            max: Some(max),
        }
    }

    /// Exact size.
    pub fn size(size: usize) -> Self {
        Self::size_range(size, size)
    }

    /// Permitted alphabet from the characters of `chars`.
    pub fn permitted_alphabet(chars: &str) -> Self {
        Constraint::PermittedAlphabet {
            alphabet: chars.chars().collect(),
        }
    }

    /// Family name of this constraint, used in violation reports.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::SingleValue { .. } => "single-value",
            Constraint::ValueRange { .. } => "value-range",
            Constraint::SizeRange { .. } => "size",
            Constraint::PermittedAlphabet { .. } => "permitted-alphabet",
            Constraint::Intersection { .. } => "intersection",
            Constraint::Union { .. } => "union",
            Constraint::Exclusion { .. } => "exclusion",
        }
    }

    /// Evaluate this constraint against the subjects of a value.
    pub fn check(&self, subjects: &[Subject<'_>]) -> Result<()> {
        if self.holds(subjects) {
            Ok(())
        } else {
            Err(ErrorKind::ConstraintViolation {
                constraint: self.name(),
            }
            .into())
        }
    }

    fn holds(&self, subjects: &[Subject<'_>]) -> bool {
        match self {
            Constraint::SingleValue { values } => subjects.iter().any(|s| match s {
                Subject::Integer(v) => values.iter().any(|allowed| allowed == *v),
                _ => false,
            }),
            Constraint::ValueRange { min, max } => subjects.iter().any(|s| match s {
                Subject::Integer(v) => {
                    min.as_ref().map_or(true, |m| *v >= m)
                        && max.as_ref().map_or(true, |m| *v <= m)
                }
                _ => false,
            }),
            Constraint::SizeRange { min, max } => subjects.iter().any(|s| match s {
                Subject::Size(n) => *n >= *min && max.map_or(true, |m| *n <= m),
                _ => false,
            }),
            Constraint::PermittedAlphabet { alphabet } => subjects.iter().any(|s| match s {
                Subject::Text(text) => text.chars().all(|c| alphabet.contains(&c)),
                _ => false,
            }),
            Constraint::Intersection { constraints } => {
                constraints.iter().all(|c| c.holds(subjects))
            }
            Constraint::Union { constraints } => constraints.iter().any(|c| c.holds(subjects)),
            Constraint::Exclusion { constraint } => !constraint.holds(subjects),
        }
    }
}

/// Ordered collection of constraints attached to a type.
///
/// The collection behaves as an intersection: every member must hold.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// The unconstrained set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Constraint set from the given members.
    pub fn new<I: IntoIterator<Item = Constraint>>(constraints: I) -> Self {
        Self {
            constraints: constraints.into_iter().collect(),
        }
    }

    /// Members of this set, in evaluation order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate every member against the subjects of a value,
    /// short-circuiting on the first failure.
    pub fn check(&self, subjects: &[Subject<'_>]) -> Result<()> {
        for constraint in &self.constraints {
            constraint.check(subjects)?;
        }

        Ok(())
    }

    /// Does this set contain a structurally equal constraint?
    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.iter().any(|c| {
            c == constraint
                || matches!(c, Constraint::Intersection { constraints }
                    if constraints.iter().any(|m| m == constraint))
        })
    }

    /// Is this set a super-set of `other` in the subtyping sense?
    ///
    /// A super-type accepts at least the values of its subtype, so every
    /// constraint of the super-type must appear in the subtype's set.
    pub fn is_super_set_of(&self, other: &ConstraintSet) -> bool {
        self.constraints.iter().all(|c| other.has_constraint(c))
    }

    /// This set extended with additional constraints (subtyping).
    pub fn extended<I: IntoIterator<Item = Constraint>>(&self, additional: I) -> Self {
        let mut constraints = self.constraints.clone();
        constraints.extend(additional);
        Self { constraints }
    }
}
