//! Open-type bindings for late-bound fields.
//!
//! An open type binds an `ANY` carrier field to a finite table of concrete
//! schemas keyed by the value of a sibling discriminator field. After a
//! first decode pass produces the opaque carrier, an optional second pass
//! looks the discriminator up here and re-decodes the carrier's payload
//! under the resolved schema.

use crate::asn1::Value;

/// Discriminator-keyed schema table attached to an `ANY` carrier field.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenType {
    /// Name of the sibling discriminator field.
    name: String,

    /// `(discriminator value, schema)` members; looked up by value equality.
    members: Vec<(Value, Value)>,
}

impl OpenType {
    /// Create an open type keyed by the named sibling field.
    pub fn new<S, I>(name: S, members: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (Value, Value)>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
        }
    }

    /// Name of the discriminator field.
    pub fn discriminator(&self) -> &str {
        &self.name
    }

    /// Resolve the schema bound to the given discriminator value.
    pub fn resolve(&self, discriminator: &Value) -> Option<&Value> {
        self.members
            .iter()
            .find(|(key, _)| key == discriminator)
            .map(|(_, schema)| schema)
    }
}
