//! Named-type tables for constructed types.
//!
//! A [`NamedTypes`] table is the ordered `field name → (type, kind)` map
//! behind `SEQUENCE`, `SET` and `CHOICE`. It lazily builds the indices the
//! decoders walk: the per-position disambiguation windows used by
//! `SEQUENCE` to resolve `OPTIONAL`/`DEFAULT` ambiguity, and the global
//! tag map used by `SET` and `CHOICE` where position carries no
//! information.

use crate::asn1::Value;
use crate::opentype::OpenType;
use crate::{ErrorKind, Result, Tag};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Presence contract of one component.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentKind {
    /// The component must be present on the wire.
    Required,

    /// The component may be absent.
    Optional,

    /// The component may be absent; this value applies when it is.
    Defaulted(Value),
}

/// One `(name, type, kind)` entry of a named-type table.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedType {
    name: String,
    schema: Value,
    kind: ComponentKind,
    open_type: Option<OpenType>,
}

impl NamedType {
    /// A required component.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            kind: ComponentKind::Required,
            open_type: None,
        }
    }

    /// An `OPTIONAL` component.
    pub fn optional(name: impl Into<String>, schema: Value) -> Self {
        Self {
            kind: ComponentKind::Optional,
            ..Self::new(name, schema)
        }
    }

    /// A `DEFAULT` component; `default` must hold a value.
    pub fn defaulted(name: impl Into<String>, default: Value) -> Result<Self> {
        if !default.has_value() {
            return Err(ErrorKind::NoValue.into());
        }

        Ok(Self {
            kind: ComponentKind::Defaulted(default.clone()),
            ..Self::new(name, default)
        })
    }

    /// Attach an open-type binding: this component is a late-bound carrier
    /// resolved through a sibling discriminator.
    pub fn with_open_type(mut self, open_type: OpenType) -> Self {
        self.open_type = Some(open_type);
        self
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared component type.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Presence contract.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Open-type binding, if any.
    pub fn open_type(&self) -> Option<&OpenType> {
        self.open_type.as_ref()
    }

    /// May this component be absent on the wire?
    pub fn is_slack(&self) -> bool {
        !matches!(self.kind, ComponentKind::Required)
    }

    /// Declared default value, for `DEFAULT` components.
    pub fn default_value(&self) -> Option<&Value> {
        match &self.kind {
            ComponentKind::Defaulted(default) => Some(default),
            _ => None,
        }
    }
}

/// Outer tags one component accepts on the wire.
#[derive(Clone, Debug)]
struct Accepted {
    tags: Vec<Tag>,
    wildcard: bool,
}

/// Lazily-built tag indices.
#[derive(Clone, Debug)]
struct TagMaps {
    /// Per-position accepted outer tags.
    accepted: Vec<Accepted>,

    /// Per-position exclusive end of the disambiguation window.
    window_ends: Vec<usize>,

    /// First tag claimed by more than one component, if any.
    duplicate: Option<Tag>,
}

/// Ordered named-type table with tag → position and name → position
/// indices.
#[derive(Clone, Debug)]
pub struct NamedTypes {
    items: Vec<NamedType>,
    maps: OnceLock<TagMaps>,
}

impl PartialEq for NamedTypes {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl NamedTypes {
    /// Build a table; duplicate component names are a schema error.
    pub fn new<I: IntoIterator<Item = NamedType>>(items: I) -> Result<Self> {
        let items: Vec<NamedType> = items.into_iter().collect();

        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|seen| seen.name == item.name) {
                return Err(ErrorKind::DuplicateName {
                    name: item.name.clone(),
                }
                .into());
            }
        }

        Ok(Self {
            items,
            maps: OnceLock::new(),
        })
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the components in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.items.iter()
    }

    /// Component at `position`.
    pub fn get(&self, position: usize) -> Option<&NamedType> {
        self.items.get(position)
    }

    /// Declared type of the component at `position`.
    pub fn type_at(&self, position: usize) -> Result<&Value> {
        self.get(position)
            .map(NamedType::schema)
            .ok_or_else(|| position_error(position))
    }

    /// Name of the component at `position`.
    pub fn name_at(&self, position: usize) -> Result<&str> {
        self.get(position)
            .map(NamedType::name)
            .ok_or_else(|| position_error(position))
    }

    /// Position of the component named `name`.
    pub fn position_of(&self, name: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.name == name)
            .ok_or_else(|| {
                ErrorKind::UnknownComponent { name: name.into() }.into()
            })
    }

    /// Position of the first component accepting `tag`, searching the whole
    /// table (the global tag map of `SET` and `CHOICE`).
    pub fn position_of_tag(&self, tag: Tag) -> Option<usize> {
        let maps = self.maps();

        (0..self.items.len())
            .find(|&pos| accepts(&maps.accepted[pos], tag))
    }

    /// Exclusive end of the disambiguation window opening at `position`:
    /// the run of `OPTIONAL`/`DEFAULT` components up to and including the
    /// next required one.
    pub fn window_end(&self, position: usize) -> usize {
        self.maps()
            .window_ends
            .get(position)
            .copied()
            .unwrap_or(self.items.len())
    }

    /// Position `≥ position` inside the disambiguation window that accepts
    /// `tag`; used by the decoder to skip over omitted components.
    pub fn position_near_tag(&self, position: usize, tag: Tag) -> Option<usize> {
        let maps = self.maps();

        (position..self.window_end(position))
            .find(|&pos| accepts(&maps.accepted[pos], tag))
    }

    /// Does the component at `position` accept `tag`?
    pub fn accepts(&self, position: usize, tag: Tag) -> bool {
        self.maps()
            .accepted
            .get(position)
            .is_some_and(|acc| accepts(acc, tag))
    }

    /// Fail unless every component claims a distinct set of outer tags
    /// (required when the enclosing type is `SET` or `CHOICE`).
    pub fn ensure_unambiguous(&self) -> Result<()> {
        match self.maps().duplicate {
            Some(tag) => Err(ErrorKind::AmbiguousTag { tag }.into()),
            None => Ok(()),
        }
    }

    fn maps(&self) -> &TagMaps {
        self.maps.get_or_init(|| {
            let accepted: Vec<Accepted> = self
                .items
                .iter()
                .map(|item| {
                    let mut tags = Vec::new();
                    let wildcard = item.schema.outer_tags(&mut tags);
                    Accepted { tags, wildcard }
                })
                .collect();

            let mut seen = BTreeSet::new();
            let mut duplicate = None;

            for acc in &accepted {
                for &tag in &acc.tags {
                    if !seen.insert(tag) && duplicate.is_none() {
                        duplicate = Some(tag);
                    }
                }
            }

            let window_ends = (0..self.items.len())
                .map(|start| {
                    for (position, item) in self.items.iter().enumerate().skip(start) {
                        if !item.is_slack() {
                            return position + 1;
                        }
                    }
                    self.items.len()
                })
                .collect();

            TagMaps {
                accepted,
                window_ends,
                duplicate,
            }
        })
    }
}

fn accepts(accepted: &Accepted, tag: Tag) -> bool {
    accepted.wildcard || accepted.tags.contains(&tag)
}

fn position_error(position: usize) -> crate::Error {
    ErrorKind::UnknownComponent {
        name: position.to_string(),
    }
    .into()
}
