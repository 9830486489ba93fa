// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy notifications.
//!
//! ## Overview
//!
//! Mutations record [`HierarchyEvent`]s on the [`Tree`](crate::Tree) in the order they happen.
//! Collaborators drain them with [`Tree::take_events`](crate::Tree::take_events), typically once per frame,
//! instead of subscribing to callbacks.
//!
//! Recording is off by default and enabled with
//! [`Tree::set_record_events`](crate::Tree::set_record_events). A tree that records events keeps
//! them until they are drained, so turn recording on only when something consumes the queue.
//!
//! An insert of a subtree rooted at `child` under `parent` records, in order:
//! 1. [`HierarchyEvent::HierarchyStateChanged`] for every node whose hierarchy enable state flipped.
//! 2. [`HierarchyEvent::Inserted`] for `child`, then [`HierarchyEvent::HierarchyInserted`] for each descendant (pre-order).
//! 3. [`HierarchyEvent::ChildInserted`] for `parent`.
//!
//! Removal mirrors this with the `Removed` variants.

/// A single hierarchy notification.
///
/// Only recorded while [`Tree::set_record_events`](crate::Tree::set_record_events) is on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HierarchyEvent<K> {
    /// `child` was added to `parent`'s children.
    ChildInserted {
        /// The node that gained a child.
        parent: K,
        /// The inserted child.
        child: K,
    },
    /// `node` is the root of a subtree that was inserted under `parent`.
    Inserted {
        /// Root of the inserted subtree.
        node: K,
        /// The new parent.
        parent: K,
    },
    /// `node` is a descendant of a subtree that was inserted under `parent`.
    HierarchyInserted {
        /// A descendant of the inserted subtree root.
        node: K,
        /// The parent the subtree root was inserted under.
        parent: K,
    },
    /// `child` was removed from `parent`'s children.
    ChildRemoved {
        /// The node that lost a child.
        parent: K,
        /// The removed child.
        child: K,
    },
    /// `node` is the root of a subtree that was detached from `parent`.
    Removed {
        /// Root of the removed subtree.
        node: K,
        /// The former parent.
        parent: K,
    },
    /// `node` is a descendant of a subtree that was detached from `parent`.
    HierarchyRemoved {
        /// A descendant of the removed subtree root.
        node: K,
        /// The former parent of the subtree root.
        parent: K,
    },
    /// The derived hierarchy enable state of `node` changed.
    HierarchyStateChanged {
        /// The node whose state changed.
        node: K,
        /// The new value of its hierarchy enable state.
        enabled: bool,
    },
}

impl<K: Copy> HierarchyEvent<K> {
    /// The node the event is addressed to.
    ///
    /// `ChildInserted`/`ChildRemoved` are addressed to the parent; every other event to the node it describes.
    pub fn target(&self) -> K {
        match *self {
            Self::ChildInserted { parent, .. } | Self::ChildRemoved { parent, .. } => parent,
            Self::Inserted { node, .. }
            | Self::HierarchyInserted { node, .. }
            | Self::Removed { node, .. }
            | Self::HierarchyRemoved { node, .. }
            | Self::HierarchyStateChanged { node, .. } => node,
        }
    }
}
