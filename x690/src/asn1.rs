//! The ASN.1 value/type model.
//!
//! One module per ASN.1 type. Every value object carries its [`TagSet`],
//! its [`ConstraintSet`] and an optional payload; an object with no payload
//! *is* the schema for its type, and payload access on it fails with
//! [`ErrorKind::NoValue`].
//!
//! [`TagSet`]: crate::TagSet
//! [`ConstraintSet`]: crate::ConstraintSet
//! [`ErrorKind::NoValue`]: crate::ErrorKind::NoValue

pub mod any;
pub mod bit_string;
pub mod boolean;
pub mod choice;
pub mod enumerated;
pub mod integer;
pub mod null;
pub mod octet_string;
pub mod oid;
pub mod real;
pub mod sequence;
pub mod sequence_of;
pub mod string;
pub mod time;
pub mod value;

pub use self::{
    any::Any,
    bit_string::BitString,
    boolean::Boolean,
    choice::Choice,
    enumerated::Enumerated,
    integer::Integer,
    null::Null,
    octet_string::OctetString,
    oid::ObjectIdentifier,
    real::{Real, RealValue},
    sequence::{Sequence, Set},
    sequence_of::{SequenceOf, SetOf},
    string::{CharacterString, StrKind},
    time::{GeneralizedTime, UtcTime},
    value::Value,
};

/// Generates the metadata surface shared by every value type: tag set and
/// constraint accessors, the schema/value distinction, subtyping and the
/// type-relation predicates.
macro_rules! value_metadata {
    ($ty:ident) => {
        impl $ty {
            /// Tag set of this value.
            pub fn tag_set(&self) -> &crate::TagSet {
                &self.tag_set
            }

            /// Constraints attached to this value.
            pub fn constraints(&self) -> &crate::ConstraintSet {
                &self.constraints
            }

            /// Does this object hold a value, as opposed to being a schema?
            pub fn has_value(&self) -> bool {
                self.inner.is_some()
            }

            /// Derive a subtype by implicit tagging: the outermost tag is
            /// replaced.
            pub fn subtype_implicit(&self, tag: crate::Tag) -> Self {
                let mut v = self.clone();
                v.tag_set = v.tag_set.tag_implicitly(tag);
                v
            }

            /// Derive a subtype by explicit tagging: a new outer tag is
            /// prepended.
            pub fn subtype_explicit(&self, tag: crate::Tag) -> crate::Result<Self> {
                let mut v = self.clone();
                v.tag_set = v.tag_set.tag_explicitly(tag)?;
                Ok(v)
            }

            /// Derive a subtype with additional constraints, the new set
            /// being the intersection of the old and the new.
            ///
            /// An existing payload is re-checked against the extended set.
            pub fn constrained<I>(&self, additional: I) -> crate::Result<Self>
            where
                I: IntoIterator<Item = crate::Constraint>,
            {
                let mut v = self.clone();
                v.constraints = v.constraints.extended(additional);
                v.check_constraints()?;
                Ok(v)
            }

            /// Sibling of this value with the given tag set.
            pub(crate) fn retagged(&self, tag_set: crate::TagSet) -> Self {
                let mut v = self.clone();
                v.tag_set = tag_set;
                v
            }

            /// Do `self` and `other` declare the same type (tag sets and
            /// constraints match)?
            pub fn is_same_type_as(&self, other: &Self) -> bool {
                self.tag_set == other.tag_set && self.constraints == other.constraints
            }

            /// Is `self` a super-type of `other`?
            pub fn is_super_type_of(&self, other: &Self) -> bool {
                self.tag_set.is_super_set_of(&other.tag_set)
                    && self.constraints.is_super_set_of(&other.constraints)
            }
        }
    };
}

pub(crate) use value_metadata;
