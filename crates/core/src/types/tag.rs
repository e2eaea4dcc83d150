//! Customer tags.
//!
//! The directory service stores a customer's tags as a single comma-joined
//! string. [`TagSet`] parses that string into an ordered, deduplicated set and
//! writes it back in the same format.

use core::fmt;

/// A single customer tag, such as `rebate` or `quote-request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(&'static str);

impl Tag {
    /// Applied to customers who requested a rebate form.
    pub const REBATE: Self = Self("rebate");

    /// Applied to customers who submitted a sales quote request.
    pub const QUOTE_REQUEST: Self = Self("quote-request");

    /// Returns the tag as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// An ordered set of tags parsed from a comma-separated string.
///
/// Entries are trimmed, empty entries are dropped, and duplicates keep only
/// their first occurrence. Membership is exact (case-sensitive).
///
/// ```
/// use popup_relay_core::{Tag, TagSet};
///
/// let mut tags = TagSet::parse("vip, newsletter,vip");
/// assert_eq!(tags.to_string(), "vip,newsletter");
///
/// assert!(tags.insert(Tag::REBATE));
/// assert!(!tags.insert(Tag::REBATE));
/// assert_eq!(tags.to_string(), "vip,newsletter,rebate");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Parse a comma-separated tag string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::default();
        for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !set.contains(tag) {
                set.0.push(tag.to_owned());
            }
        }
        set
    }

    /// Returns true if the set contains `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Append `tag` if absent. Returns true if the set changed.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.contains(tag.as_str()) {
            return false;
        }
        self.0.push(tag.as_str().to_owned());
        true
    }

    /// Number of tags in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no tags.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}
