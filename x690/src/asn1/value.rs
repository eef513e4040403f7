//! The dynamic value type spanning the ASN.1 universe.

use crate::asn1::{
    Any, BitString, Boolean, CharacterString, Choice, Enumerated, GeneralizedTime, Integer, Null,
    ObjectIdentifier, OctetString, Real, Sequence, SequenceOf, Set, SetOf, UtcTime,
};
use crate::{Constraint, ConstraintSet, Result, Tag, TagSet};
use core::fmt;

/// Any ASN.1 value (or schema), dispatched by variant.
///
/// Every variant shares the same metadata surface: a tag set, constraints
/// and the schema/value distinction. The codecs dispatch on the variant
/// discriminator.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// `BOOLEAN`.
    Boolean(Boolean),

    /// `INTEGER`.
    Integer(Integer),

    /// `BIT STRING`.
    BitString(BitString),

    /// `OCTET STRING`.
    OctetString(OctetString),

    /// `NULL`.
    Null(Null),

    /// `OBJECT IDENTIFIER`.
    ObjectIdentifier(ObjectIdentifier),

    /// `REAL`.
    Real(Real),

    /// `ENUMERATED`.
    Enumerated(Enumerated),

    /// The character-string family.
    CharacterString(CharacterString),

    /// `UTCTime`.
    UtcTime(UtcTime),

    /// `GeneralizedTime`.
    GeneralizedTime(GeneralizedTime),

    /// `SEQUENCE OF`.
    SequenceOf(SequenceOf),

    /// `SET OF`.
    SetOf(SetOf),

    /// `SEQUENCE`.
    Sequence(Sequence),

    /// `SET`.
    Set(Set),

    /// `CHOICE`.
    Choice(Choice),

    /// `ANY`.
    Any(Any),
}

/// Apply an expression to the payload of every variant.
macro_rules! for_each {
    ($self:expr, $v:ident => $e:expr) => {
        match $self {
            Value::Boolean($v) => $e,
            Value::Integer($v) => $e,
            Value::BitString($v) => $e,
            Value::OctetString($v) => $e,
            Value::Null($v) => $e,
            Value::ObjectIdentifier($v) => $e,
            Value::Real($v) => $e,
            Value::Enumerated($v) => $e,
            Value::CharacterString($v) => $e,
            Value::UtcTime($v) => $e,
            Value::GeneralizedTime($v) => $e,
            Value::SequenceOf($v) => $e,
            Value::SetOf($v) => $e,
            Value::Sequence($v) => $e,
            Value::Set($v) => $e,
            Value::Choice($v) => $e,
            Value::Any($v) => $e,
        }
    };
}

/// Apply an expression to the payloads of two values of the same variant.
macro_rules! pairwise {
    ($a:expr, $b:expr, $x:ident, $y:ident => $e:expr, $other:expr) => {
        match ($a, $b) {
            (Value::Boolean($x), Value::Boolean($y)) => $e,
            (Value::Integer($x), Value::Integer($y)) => $e,
            (Value::BitString($x), Value::BitString($y)) => $e,
            (Value::OctetString($x), Value::OctetString($y)) => $e,
            (Value::Null($x), Value::Null($y)) => $e,
            (Value::ObjectIdentifier($x), Value::ObjectIdentifier($y)) => $e,
            (Value::Real($x), Value::Real($y)) => $e,
            (Value::Enumerated($x), Value::Enumerated($y)) => $e,
            (Value::CharacterString($x), Value::CharacterString($y)) => $e,
            (Value::UtcTime($x), Value::UtcTime($y)) => $e,
            (Value::GeneralizedTime($x), Value::GeneralizedTime($y)) => $e,
            (Value::SequenceOf($x), Value::SequenceOf($y)) => $e,
            (Value::SetOf($x), Value::SetOf($y)) => $e,
            (Value::Sequence($x), Value::Sequence($y)) => $e,
            (Value::Set($x), Value::Set($y)) => $e,
            (Value::Choice($x), Value::Choice($y)) => $e,
            (Value::Any($x), Value::Any($y)) => $e,
            _ => $other,
        }
    };
}

impl Value {
    /// Tag set of this value.
    pub fn tag_set(&self) -> &TagSet {
        for_each!(self, v => v.tag_set())
    }

    /// Constraints attached to this value.
    pub fn constraints(&self) -> &ConstraintSet {
        for_each!(self, v => v.constraints())
    }

    /// Does this object hold a value, as opposed to being a schema?
    pub fn has_value(&self) -> bool {
        for_each!(self, v => v.has_value())
    }

    /// The tag set this value presents on the wire.
    ///
    /// Identical to [`Value::tag_set`] except for an untagged `CHOICE`,
    /// which presents its chosen alternative's tags.
    pub fn effective_tag_set(&self) -> TagSet {
        match self {
            Value::Choice(choice) => choice.effective_tag_set(),
            other => other.tag_set().clone(),
        }
    }

    /// Derive a subtype by implicit tagging.
    pub fn subtype_implicit(&self, tag: Tag) -> Value {
        for_each!(self, v => v.subtype_implicit(tag).into())
    }

    /// Derive a subtype by explicit tagging.
    pub fn subtype_explicit(&self, tag: Tag) -> Result<Value> {
        for_each!(self, v => Ok(v.subtype_explicit(tag)?.into()))
    }

    /// Derive a subtype with additional constraints.
    pub fn constrained<I>(&self, additional: I) -> Result<Value>
    where
        I: IntoIterator<Item = Constraint>,
    {
        for_each!(self, v => Ok(v.constrained(additional)?.into()))
    }

    /// Sibling of this value with the given tag set.
    pub(crate) fn retagged(&self, tag_set: TagSet) -> Value {
        for_each!(self, v => v.retagged(tag_set).into())
    }

    /// Do `self` and `other` declare the same type?
    pub fn is_same_type_as(&self, other: &Value) -> bool {
        pairwise!(self, other, a, b => a.is_same_type_as(b), false)
    }

    /// Is `self` a super-type of `other`?
    pub fn is_super_type_of(&self, other: &Value) -> bool {
        pairwise!(self, other, a, b => a.is_super_type_of(b), false)
    }

    /// ASN.1 name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::BitString(_) => "BIT STRING",
            Value::OctetString(_) => "OCTET STRING",
            Value::Null(_) => "NULL",
            Value::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Value::Real(_) => "REAL",
            Value::Enumerated(_) => "ENUMERATED",
            Value::CharacterString(_) => "CharacterString",
            Value::UtcTime(_) => "UTCTime",
            Value::GeneralizedTime(_) => "GeneralizedTime",
            Value::SequenceOf(_) => "SEQUENCE OF",
            Value::SetOf(_) => "SET OF",
            Value::Sequence(_) => "SEQUENCE",
            Value::Set(_) => "SET",
            Value::Choice(_) => "CHOICE",
            Value::Any(_) => "ANY",
        }
    }

    /// Check the payload against the declared constraints.
    pub(crate) fn check_constraints(&self) -> Result<()> {
        for_each!(self, v => v.check_constraints())
    }

    /// Collect the outer tags this value accepts on the wire into `tags`,
    /// returning `true` when the value accepts any tag (`ANY`, or a
    /// `CHOICE` reaching one).
    pub(crate) fn outer_tags(&self, tags: &mut Vec<Tag>) -> bool {
        match self {
            Value::Any(any) => match any.tag_set().outer_tag() {
                Some(tag) => {
                    tags.push(tag);
                    false
                }
                None => true,
            },
            Value::Choice(choice) => {
                if let Some(tag) = choice.tag_set().outer_tag() {
                    tags.push(tag);
                    return false;
                }

                let mut wildcard = false;
                for item in choice.alternatives().iter() {
                    wildcard |= item.schema().outer_tags(tags);
                }
                wildcard
            }
            other => match other.tag_set().outer_tag() {
                Some(tag) => {
                    tags.push(tag);
                    false
                }
                None => false,
            },
        }
    }

    /// Smallest outer tag this value can present, used for DER `SET`
    /// component ordering.
    pub(crate) fn min_outer_tag(&self) -> Option<Tag> {
        match self {
            Value::Choice(choice) => choice.min_outer_tag(),
            other => other.tag_set().outer_tag(),
        }
    }
}

impl fmt::Display for Value {
    /// Render the value the way an ASN.1 value notation sketch would,
    /// nested constructed values indented by their depth. A schema object
    /// renders as its type name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f, 0)
    }
}

fn display(value: &Value, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if !value.has_value() {
        return f.write_str(value.type_name());
    }

    match value {
        Value::Boolean(v) => f.write_str(if v.value().unwrap_or(false) {
            "TRUE"
        } else {
            "FALSE"
        }),
        Value::Integer(v) => match v.symbol() {
            Ok(Some(symbol)) => write!(f, "{}", symbol),
            _ => match v.value() {
                Ok(n) => write!(f, "{}", n),
                Err(_) => f.write_str("INTEGER"),
            },
        },
        Value::Enumerated(v) => match v.symbol() {
            Ok(symbol) => f.write_str(symbol),
            Err(_) => match v.value() {
                Ok(n) => write!(f, "{}", n),
                Err(_) => f.write_str("ENUMERATED"),
            },
        },
        Value::BitString(v) => {
            f.write_str("'")?;
            if let Ok(bits) = v.value() {
                for bit in bits {
                    f.write_str(if *bit { "1" } else { "0" })?;
                }
            }
            f.write_str("'B")
        }
        Value::OctetString(v) => {
            let bytes = v.value().map_err(|_| fmt::Error)?;

            if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                write!(f, "\"{}\"", String::from_utf8_lossy(bytes))
            } else {
                f.write_str("'")?;
                for byte in bytes.iter() {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str("'H")
            }
        }
        Value::Null(_) => f.write_str("NULL"),
        Value::ObjectIdentifier(v) => write!(f, "{}", v),
        Value::Real(v) => match v.to_f64() {
            Ok(n) => write!(f, "{}", n),
            Err(_) => f.write_str("REAL"),
        },
        Value::CharacterString(v) => write!(f, "\"{}\"", v.value().map_err(|_| fmt::Error)?),
        Value::UtcTime(v) => write!(f, "\"{}\"", v.value().map_err(|_| fmt::Error)?),
        Value::GeneralizedTime(v) => {
            write!(f, "\"{}\"", v.value().map_err(|_| fmt::Error)?)
        }
        Value::SequenceOf(v) => {
            let items = v.items().map_err(|_| fmt::Error)?;
            display_items(f, depth, items.iter().map(|item| (None, item)))
        }
        Value::SetOf(v) => {
            let items = v.items().map_err(|_| fmt::Error)?;
            display_items(f, depth, items.iter().map(|item| (None, item)))
        }
        Value::Sequence(v) => display_record(f, depth, v.components(), |i| {
            v.component_at(i).unwrap_or(None)
        }),
        Value::Set(v) => display_record(f, depth, v.components(), |i| {
            v.component_at(i).unwrap_or(None)
        }),
        Value::Choice(v) => {
            let (name, chosen) = v.chosen().map_err(|_| fmt::Error)?;
            write!(f, "{}: ", name)?;
            display(chosen, f, depth)
        }
        Value::Any(v) => {
            f.write_str("'")?;
            for byte in v.value().map_err(|_| fmt::Error)?.iter() {
                write!(f, "{:02X}", byte)?;
            }
            f.write_str("'H")
        }
    }
}

fn display_items<'v>(
    f: &mut fmt::Formatter<'_>,
    depth: usize,
    items: impl Iterator<Item = (Option<&'v str>, &'v Value)>,
) -> fmt::Result {
    f.write_str("{")?;

    let mut any = false;
    for (name, item) in items {
        any = true;
        write!(f, "\n{:indent$}", "", indent = (depth + 1) * 2)?;
        if let Some(name) = name {
            write!(f, "{} ", name)?;
        }
        display(item, f, depth + 1)?;
    }

    if any {
        write!(f, "\n{:indent$}", "", indent = depth * 2)?;
    }
    f.write_str("}")
}

fn display_record<'v>(
    f: &mut fmt::Formatter<'_>,
    depth: usize,
    components: &'v crate::NamedTypes,
    get: impl Fn(usize) -> Option<&'v Value>,
) -> fmt::Result {
    // Render what is actually set; absent OPTIONAL/DEFAULT components stay
    // silent like they do on the wire.
    let present = components
        .iter()
        .enumerate()
        .filter_map(|(i, item)| get(i).map(|value| (Some(item.name()), value)));

    display_items(f, depth, present)
}

impl From<Boolean> for Value {
    fn from(v: Boolean) -> Value {
        Value::Boolean(v)
    }
}

impl From<Integer> for Value {
    fn from(v: Integer) -> Value {
        Value::Integer(v)
    }
}

impl From<BitString> for Value {
    fn from(v: BitString) -> Value {
        Value::BitString(v)
    }
}

impl From<OctetString> for Value {
    fn from(v: OctetString) -> Value {
        Value::OctetString(v)
    }
}

impl From<Null> for Value {
    fn from(v: Null) -> Value {
        Value::Null(v)
    }
}

impl From<ObjectIdentifier> for Value {
    fn from(v: ObjectIdentifier) -> Value {
        Value::ObjectIdentifier(v)
    }
}

impl From<Real> for Value {
    fn from(v: Real) -> Value {
        Value::Real(v)
    }
}

impl From<Enumerated> for Value {
    fn from(v: Enumerated) -> Value {
        Value::Enumerated(v)
    }
}

impl From<CharacterString> for Value {
    fn from(v: CharacterString) -> Value {
        Value::CharacterString(v)
    }
}

impl From<UtcTime> for Value {
    fn from(v: UtcTime) -> Value {
        Value::UtcTime(v)
    }
}

impl From<GeneralizedTime> for Value {
    fn from(v: GeneralizedTime) -> Value {
        Value::GeneralizedTime(v)
    }
}

impl From<SequenceOf> for Value {
    fn from(v: SequenceOf) -> Value {
        Value::SequenceOf(v)
    }
}

impl From<SetOf> for Value {
    fn from(v: SetOf) -> Value {
        Value::SetOf(v)
    }
}

impl From<Sequence> for Value {
    fn from(v: Sequence) -> Value {
        Value::Sequence(v)
    }
}

impl From<Set> for Value {
    fn from(v: Set) -> Value {
        Value::Set(v)
    }
}

impl From<Choice> for Value {
    fn from(v: Choice) -> Value {
        Value::Choice(v)
    }
}

impl From<Any> for Value {
    fn from(v: Any) -> Value {
        Value::Any(v)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::asn1::{Choice, Integer, OctetString};
    use crate::{NamedType, NamedTypes, Tag};

    #[test]
    fn effective_tag_set_of_untagged_choice() {
        let choice = Choice::schema(
            NamedTypes::new([
                NamedType::new("name", Value::from(OctetString::schema())),
                NamedType::new("id", Value::from(Integer::schema())),
            ])
            .unwrap(),
        )
        .unwrap();

        let chosen = choice
            .with_chosen("id", Value::from(Integer::new(1)))
            .unwrap();

        assert!(Value::from(choice).effective_tag_set().is_empty());
        assert_eq!(
            Value::from(chosen).effective_tag_set().outer_tag(),
            Some(Tag::INTEGER)
        );
    }

    #[test]
    fn cross_variant_type_relations_fail() {
        let int = Value::from(Integer::schema());
        let octets = Value::from(OctetString::schema());

        assert!(!int.is_same_type_as(&octets));
        assert!(!int.is_super_type_of(&octets));
        assert!(int.is_same_type_as(&Value::from(Integer::new(5))));
    }

    #[test]
    fn rendering() {
        use crate::asn1::{Null, Sequence};
        use crate::{NamedType, NamedTypes};

        let seq = Sequence::schema(
            NamedTypes::new([
                NamedType::new("null", Value::from(Null::schema())),
                NamedType::optional("id", Value::from(Integer::schema())),
            ])
            .unwrap(),
        )
        .with_component("null", Value::from(Null::new()))
        .unwrap()
        .with_component("id", Value::from(Integer::new(7)))
        .unwrap();

        let rendered = Value::from(seq).to_string();
        assert_eq!(rendered, "{\n  null NULL\n  id 7\n}");

        assert_eq!(Value::from(Integer::schema()).to_string(), "INTEGER");
        assert_eq!(Value::from(OctetString::from("ab")).to_string(), "\"ab\"");
    }

    #[test]
    fn subtype_relation_through_tagging() {
        let base = Value::from(Integer::schema());
        let derived = base.subtype_explicit(Tag::context(0)).unwrap();

        assert!(base.is_super_type_of(&derived));
        assert!(!derived.is_super_type_of(&base));
    }
}
