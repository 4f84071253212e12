//! Post tag parsing and diffing.
//!
//! Tags arrive as free text separated by commas and/or whitespace. They are
//! stored normalized (sorted, de-duplicated, joined by `", "`), and every
//! change of a post's tag set is expressed as a [`TagDelta`] so tag
//! frequencies can be adjusted by exactly the tags that changed.

use std::collections::BTreeSet;

/// Separator used in the normalized storage form.
pub const TAG_SEPARATOR: &str = ", ";

/// Longest tag, in characters, the tag table can hold.
pub const MAX_TAG_LENGTH: usize = 128;

/// A de-duplicated, ordered set of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Parse a comma- or whitespace-delimited tag string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Whether a raw tag string only contains tag characters and delimiters.
    #[must_use]
    pub fn is_valid_input(raw: &str) -> bool {
        raw.chars()
            .all(|c| is_tag_char(c) || c == ',' || c.is_whitespace())
    }

    /// Storage form: sorted tags joined by `", "`.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR)
    }

    /// Length in characters of the longest tag, 0 for an empty set.
    #[must_use]
    pub fn longest(&self) -> usize {
        self.0.iter().map(|t| t.chars().count()).max().unwrap_or(0)
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tags to increment and decrement when a post's tag set changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    /// Tags only present in the new set.
    pub added: Vec<String>,
    /// Tags only present in the old set.
    pub removed: Vec<String>,
}

impl TagDelta {
    /// Symmetric difference of two tag sets.
    #[must_use]
    pub fn between(old: &TagSet, new: &TagSet) -> Self {
        Self {
            added: new.0.difference(&old.0).cloned().collect(),
            removed: old.0.difference(&new.0).cloned().collect(),
        }
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Escape `LIKE` wildcards so `value` matches literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
