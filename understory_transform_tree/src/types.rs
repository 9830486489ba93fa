// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the transform tree: node identifiers, state flags, and typed property queries.

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On create, a fresh slot is allocated with generation `1`.
/// - On [destroy](crate::Tree::destroy), the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Hierarchy operations (add, insert, remove, reparent) never free a slot.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Per-node state flags.
    ///
    /// `ENABLED` and `SCALE_COMPENSATION` are configuration owned by the caller.
    /// The remaining bits are maintained by the [`Tree`](crate::Tree) and exposed for inspection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// The node's own enable toggle.
        const ENABLED              = 0b0000_0000_0001;
        /// Derived: the node and every ancestor up to an active root are enabled.
        const ENABLED_IN_HIERARCHY = 0b0000_0000_0010;
        /// World scale is taken from the nearest non-compensating ancestor.
        const SCALE_COMPENSATION   = 0b0000_0000_0100;
        /// Local matrix is stale.
        const DIRTY_LOCAL          = 0b0000_0000_1000;
        /// World matrix and every world-space quantity derived from it are stale.
        const DIRTY_WORLD          = 0b0000_0001_0000;
        /// Normal matrix is stale.
        const DIRTY_NORMAL         = 0b0000_0010_0000;
        /// The node and its whole subtree are unchanged since the last hierarchy sync.
        const FROZEN               = 0b0000_0100_0000;
        /// A parentless node that is the top of a live hierarchy.
        const HIERARCHY_ROOT       = 0b0000_1000_0000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// A typed node property paired with the value it must equal.
///
/// Used by [`Tree::find_by_property`](crate::Tree::find_by_property) and
/// [`Tree::find_one_by_property`](crate::Tree::find_one_by_property) as the
/// field-accessor alternative to a predicate closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property<'a> {
    /// Exact display name.
    Name(&'a str),
    /// The node carries this tag.
    Tag(&'a str),
    /// The node's own enable toggle.
    Enabled(bool),
    /// The derived hierarchy enable state.
    EnabledInHierarchy(bool),
    /// Scale compensation mode.
    ScaleCompensation(bool),
    /// Distance from the nearest root.
    GraphDepth(u32),
}
