// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tags: an unordered set of plain strings with OR-of-AND queries.

use alloc::collections::BTreeSet;
use alloc::string::String;

/// One term of a tag query.
///
/// A list of terms matches when *any* term matches. A term matches when the
/// tag set contains every tag it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagQuery<'a> {
    /// A single tag that must be present.
    One(&'a str),
    /// A group of tags that must all be present.
    All(&'a [&'a str]),
}

impl<'a> From<&'a str> for TagQuery<'a> {
    fn from(tag: &'a str) -> Self {
        Self::One(tag)
    }
}

impl<'a> From<&'a [&'a str]> for TagQuery<'a> {
    fn from(tags: &'a [&'a str]) -> Self {
        Self::All(tags)
    }
}

/// Set of string tags attached to a node.
///
/// Tags carry no schema or namespace. Insertion order is not preserved and
/// duplicates are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags {
    set: BTreeSet<String>,
}

impl Tags {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn add(&mut self, tag: &str) -> bool {
        if self.set.contains(tag) {
            return false;
        }
        self.set.insert(String::from(tag))
    }

    /// Add several tags. Returns `true` if at least one was new.
    pub fn add_all<'a>(&mut self, tags: impl IntoIterator<Item = &'a str>) -> bool {
        let mut changed = false;
        for tag in tags {
            changed |= self.add(tag);
        }
        changed
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.set.remove(tag)
    }

    /// Remove every tag.
    pub fn clear(&mut self) {
        self.set.clear();
    }

    /// Returns true if `tag` is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.set.contains(tag)
    }

    /// Returns true if every tag in `tags` is present.
    ///
    /// An empty group never matches.
    pub fn has_all(&self, tags: &[&str]) -> bool {
        !tags.is_empty() && tags.iter().all(|t| self.contains(t))
    }

    /// Evaluate an OR-of-AND query.
    ///
    /// ```
    /// use understory_transform_tree::{TagQuery, Tags};
    ///
    /// let mut tags = Tags::new();
    /// tags.add_all(["enemy", "flying"]);
    ///
    /// assert!(tags.has(&[TagQuery::One("enemy")]));
    /// assert!(tags.has(&[TagQuery::All(&["enemy", "flying"])]));
    /// assert!(!tags.has(&[TagQuery::All(&["enemy", "boss"])]));
    /// assert!(tags.has(&[TagQuery::All(&["enemy", "boss"]), TagQuery::One("flying")]));
    /// ```
    pub fn has(&self, query: &[TagQuery<'_>]) -> bool {
        query.iter().any(|term| match *term {
            TagQuery::One(tag) => self.contains(tag),
            TagQuery::All(group) => self.has_all(group),
        })
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns true if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Iterate tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.set.iter().map(String::as_str)
    }
}
