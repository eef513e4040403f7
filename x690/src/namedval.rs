//! Named-value tables: symbolic names for numeric payloads.
//!
//! Used by `INTEGER` and `ENUMERATED` to map symbols to numbers and back,
//! and by `BIT STRING` to name individual bit positions.

use crate::{ErrorKind, Result};
use num_bigint::BigInt;

/// Ordered bidirectional table of `name ↔ value` bindings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NamedValues {
    items: Vec<(String, BigInt)>,
}

impl NamedValues {
    /// Build a table from `(name, value)` bindings.
    ///
    /// Duplicate names or duplicate values are a schema error.
    pub fn new<I, S>(bindings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut items: Vec<(String, BigInt)> = Vec::new();

        for (name, value) in bindings {
            let name = name.into();
            let value = BigInt::from(value);

            if items.iter().any(|(n, v)| *n == name || *v == value) {
                return Err(ErrorKind::DuplicateName { name }.into());
            }

            items.push((name, value));
        }

        Ok(Self { items })
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(name, value)` bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigInt)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Look up the symbolic name bound to `value`.
    pub fn name_of(&self, value: &BigInt) -> Option<&str> {
        self.items
            .iter()
            .find(|(_, v)| v == value)
            .map(|(n, _)| n.as_str())
    }

    /// Look up the value bound to `name`.
    pub fn value_of(&self, name: &str) -> Option<&BigInt> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Does the table bind `value`?
    pub fn contains_value(&self, value: &BigInt) -> bool {
        self.name_of(value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::NamedValues;
    use num_bigint::BigInt;

    #[test]
    fn bidirectional_lookup() {
        let nv = NamedValues::new([("red", 0), ("green", 1), ("blue", 2)]).unwrap();

        assert_eq!(nv.value_of("green"), Some(&BigInt::from(1)));
        assert_eq!(nv.name_of(&BigInt::from(2)), Some("blue"));
        assert_eq!(nv.value_of("mauve"), None);
        assert_eq!(nv.len(), 3);
    }

    #[test]
    fn duplicate_name_rejected() {
        assert!(NamedValues::new([("a", 0), ("a", 1)]).is_err());
    }

    #[test]
    fn duplicate_value_rejected() {
        assert!(NamedValues::new([("a", 0), ("b", 0)]).is_err());
    }
}
