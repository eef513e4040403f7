//! Tag sets: the tagging history of a type.

use super::{Class, Tag};
use crate::{ErrorKind, Result};
use core::cmp::Ordering;
use core::fmt;

/// Ordered sequence of [`Tag`]s induced by nested taggings, outermost first,
/// plus the *base tag* capturing the type's universal root.
///
/// Explicit tagging prepends a new outer tag; implicit tagging replaces the
/// outermost tag. The base tag is immutable across tagging operations and is
/// what the codecs use to pick a value decoder when the outer tags are not
/// universal.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TagSet {
    /// Tags, outermost first.
    tags: Vec<Tag>,

    /// Universal root of the type, if any.
    base: Option<Tag>,
}

impl TagSet {
    /// The empty tag set of an untagged type (`CHOICE`, `ANY`).
    pub fn untagged() -> Self {
        Self {
            tags: Vec::new(),
            base: None,
        }
    }

    /// Tag set of a type rooted at the given base tag.
    pub fn of(base: Tag) -> Self {
        Self {
            tags: vec![base],
            base: Some(base),
        }
    }

    /// Derive a new tag set by explicit tagging: prepend `tag` as the new
    /// outermost tag, forced to constructed form.
    ///
    /// Tagging with a `UNIVERSAL` class tag is a schema error.
    pub fn tag_explicitly(&self, tag: Tag) -> Result<Self> {
        if tag.class() == Class::Universal {
            return Err(ErrorKind::UniversalTagging { tag }.into());
        }

        let mut tags = Vec::with_capacity(self.tags.len() + 1);
        tags.push(tag.constructed());
        tags.extend_from_slice(&self.tags);

        Ok(Self {
            tags,
            base: self.base,
        })
    }

    /// Derive a new tag set by implicit tagging: replace the outermost tag
    /// with `tag`, preserving the replaced tag's form.
    pub fn tag_implicitly(&self, tag: Tag) -> Self {
        let mut tags = self.tags.clone();

        match tags.first_mut() {
            Some(outer) => *outer = tag.with_format(outer.format()),
            None => tags.push(tag),
        }

        Self {
            tags,
            base: self.base,
        }
    }

    /// Get the base tag: the universal root of the type.
    pub fn base_tag(&self) -> Option<Tag> {
        self.base
    }

    /// Get the outermost tag, the one that appears first on the wire.
    pub fn outer_tag(&self) -> Option<Tag> {
        self.tags.first().copied()
    }

    /// Tags of this set, outermost first.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Number of tags in this set.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Is this the empty tag set of an untagged type?
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// This tag set with the outermost tag removed.
    ///
    /// Used when unwrapping one level of explicit tagging.
    pub(crate) fn without_outer(&self) -> Self {
        Self {
            tags: self.tags.get(1..).map(<[Tag]>::to_vec).unwrap_or_default(),
            base: self.base,
        }
    }

    /// Is this tag set a super-set of `other`?
    ///
    /// True when `other` derives from this set by additional outer taggings,
    /// i.e. the tail of `other`'s tag sequence matches this set's sequence.
    pub fn is_super_set_of(&self, other: &TagSet) -> bool {
        other.tags.len() >= self.tags.len() && other.tags.ends_with(&self.tags)
    }
}

impl PartialOrd for TagSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TagSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tags.cmp(&other.tags)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            return f.write_str("<untagged>");
        }

        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "[{}]", tag)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, TagSet};

    #[test]
    fn explicit_tagging_prepends_constructed() {
        let ts = TagSet::of(Tag::INTEGER)
            .tag_explicitly(Tag::context(5))
            .unwrap();

        assert_eq!(ts.len(), 2);
        assert_eq!(ts.outer_tag(), Some(Tag::context(5)));
        assert!(ts.outer_tag().unwrap().is_constructed());
        assert_eq!(ts.base_tag(), Some(Tag::INTEGER));
    }

    #[test]
    fn explicit_tagging_with_universal_fails() {
        assert!(TagSet::of(Tag::INTEGER)
            .tag_explicitly(Tag::universal(7))
            .is_err());
    }

    #[test]
    fn implicit_tagging_replaces_outer_and_preserves_format() {
        let ts = TagSet::of(Tag::SEQUENCE).tag_implicitly(Tag::context(0));

        assert_eq!(ts.len(), 1);
        assert_eq!(ts.outer_tag(), Some(Tag::context(0)));
        assert!(ts.outer_tag().unwrap().is_constructed());
        assert_eq!(ts.base_tag(), Some(Tag::SEQUENCE));
    }

    #[test]
    fn super_set_by_suffix_match() {
        let base = TagSet::of(Tag::INTEGER);
        let derived = base.tag_explicitly(Tag::context(1)).unwrap();
        let twice = derived.tag_explicitly(Tag::application(2)).unwrap();

        assert!(base.is_super_set_of(&derived));
        assert!(base.is_super_set_of(&twice));
        assert!(derived.is_super_set_of(&twice));
        assert!(!derived.is_super_set_of(&base));
    }

    #[test]
    fn base_tag_immutable_across_taggings() {
        let ts = TagSet::of(Tag::OCTET_STRING)
            .tag_implicitly(Tag::context(0))
            .tag_explicitly(Tag::context(1))
            .unwrap();

        assert_eq!(ts.base_tag(), Some(Tag::OCTET_STRING));
    }
}
