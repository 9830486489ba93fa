// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: slot storage, hierarchy mutation, and enable propagation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::event::HierarchyEvent;
use crate::node::Node;
use crate::tags::Tags;
use crate::types::{NodeFlags, NodeId};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena owning every node of one or more hierarchies.
///
/// All hierarchy links are [`NodeId`] handles into this arena; no node owns another.
/// Operations on stale identifiers are ignored (setters) or return `None` (getters).
#[derive(Clone)]
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    pub(crate) free_list: Vec<usize>,
    pub(crate) events: Vec<HierarchyEvent<NodeId>>,
    record_events: bool,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.len();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("record_events", &self.record_events)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            events: Vec::new(),
            record_events: false,
        }
    }

    /// Create a standalone node.
    ///
    /// The node has no parent, no children, an identity transform, is enabled, and is
    /// not enabled in hierarchy until it is inserted under an active parent.
    pub fn create_node(&mut self, name: &str) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(None);
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        self.nodes[id.idx()] = Some(Node::new(id, String::from(name)));
        log::trace!("created node {id:?} ({name})");
        id
    }

    /// Create the top node of a live hierarchy.
    ///
    /// Unlike [`Tree::create_node`], the result is enabled in hierarchy right away, so
    /// children added under it become active. Inserting it under another node turns it
    /// into an ordinary node.
    pub fn create_root(&mut self, name: &str) -> NodeId {
        let id = self.create_node(name);
        self.node_mut(id)
            .flags
            .insert(NodeFlags::HIERARCHY_ROOT | NodeFlags::ENABLED_IN_HIERARCHY);
        id
    }

    /// Destroy a node and its whole subtree, freeing their slots.
    ///
    /// The node is first removed from its parent (recording the usual removal events).
    /// All identifiers in the subtree become stale.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.detach(parent, id, true);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view of a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.node_opt(id)
    }

    /// Iterate live parentless nodes in slot order, inert standalone nodes included.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| n.as_ref())
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
    }

    /// Rename a node.
    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(n) = self.node_opt_mut(id) {
            n.name.clear();
            n.name.push_str(name);
        }
    }

    /// Mutable access to a node's tags.
    pub fn tags_mut(&mut self, id: NodeId) -> Option<&mut Tags> {
        self.node_opt_mut(id).map(|n| &mut n.tags)
    }

    /// Parent of a node, or `None` for roots, detached nodes, and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Ordered children of a node; empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Distance from the nearest root.
    pub fn graph_depth(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id).map(|n| n.graph_depth)
    }

    /// Topmost ancestor of a node (the node itself if it has no parent).
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.node_opt(id)?;
        while let Some(p) = cur.parent {
            cur = self.node(p);
        }
        Some(cur.id)
    }

    /// Slash-separated names from just below the root down to this node.
    ///
    /// The root's own name is not part of the path, so
    /// `tree.find_by_path(tree.root_of(id)?, &tree.path(id)?)` finds `id` again
    /// (assuming names are unique among siblings). Roots have an empty path.
    pub fn path(&self, id: NodeId) -> Option<String> {
        let node = self.node_opt(id)?;
        let mut segments: Vec<&str> = Vec::new();
        let mut cur = node;
        while let Some(p) = cur.parent {
            segments.push(&cur.name);
            cur = self.node(p);
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Returns true if `ancestor` appears on the parent chain of `id`.
    ///
    /// A node is not its own descendant.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut parent = self.parent(id);
        while let Some(p) = parent {
            if p == ancestor {
                return true;
            }
            parent = self.node(p).parent;
        }
        false
    }

    /// Returns true if `descendant` is somewhere in the subtree below `id`.
    pub fn is_ancestor_of(&self, id: NodeId, descendant: NodeId) -> bool {
        self.is_descendant_of(descendant, id)
    }

    /// Append `child` to `parent`'s children.
    ///
    /// If `child` already has a parent it is detached from it first.
    ///
    /// # Panics
    ///
    /// In debug builds, if `child == parent` or if `parent` is a descendant of `child`.
    /// Release builds log the violation and leave the tree unchanged.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.node_opt(parent).map(|p| p.children.len()) else {
            return;
        };
        self.insert_child(parent, child, index);
    }

    /// Insert `child` into `parent`'s children at `index` (clamped to the child count).
    ///
    /// See [`Tree::add_child`] for preconditions.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if !self.prepare_insert_child(parent, child) {
            return;
        }
        self.link_child(parent, child, index);
    }

    /// Append `child` to `parent` while keeping its world position and rotation.
    ///
    /// The local position and rotation of `child` are rewritten relative to the new parent.
    /// World scale is not preserved.
    pub fn add_child_and_save_transform(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.node_opt(parent).map(|p| p.children.len()) else {
            return;
        };
        self.insert_child_and_save_transform(parent, child, index);
    }

    /// Like [`Tree::add_child_and_save_transform`], inserting at `index`.
    pub fn insert_child_and_save_transform(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if !self.check_insert(parent, child) {
            return;
        }
        let world_position = self.synced_world(child).w_axis.truncate();
        let world_rotation = self.world_rotation_of(child);

        if !self.prepare_insert_child(parent, child) {
            return;
        }

        let inv_parent = self.synced_world(parent).inverse();
        let inv_parent_rotation = self.world_rotation_of(parent).inverse();
        self.set_local_position(child, inv_parent.transform_point3(world_position));
        self.set_local_rotation(child, inv_parent_rotation * world_rotation);

        self.link_child(parent, child, index);
    }

    /// Detach `child` from `parent`.
    ///
    /// Returns `false` if `child` is not a child of `parent`. The child keeps its cached
    /// transforms (its last computed world transform), becomes a root with graph depth `0`,
    /// and its subtree is no longer enabled in hierarchy.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        self.detach(parent, child, true)
    }

    /// Move `child` under `new_parent`, optionally at `index`; `None` detaches it.
    pub fn reparent(&mut self, child: NodeId, new_parent: Option<NodeId>, index: Option<usize>) {
        match (new_parent, index) {
            (Some(p), Some(i)) => self.insert_child(p, child, i),
            (Some(p), None) => self.add_child(p, child),
            (None, _) => {
                if let Some(old) = self.parent(child) {
                    self.remove_child(old, child);
                }
            }
        }
    }

    /// Set a node's own enable toggle.
    ///
    /// Disabling always deactivates the node and its subtree. Enabling only reactivates
    /// them when the parent is itself enabled in hierarchy (or the node is a hierarchy root).
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.is_enabled() == enabled {
            return;
        }
        node.flags.set(NodeFlags::ENABLED, enabled);
        let (parent, is_root) = (node.parent, node.is_hierarchy_root());
        let parent_active = match parent {
            Some(p) => self.is_active(p),
            None => is_root,
        };
        log::debug!("node {id:?} enabled = {enabled}");
        if !enabled || parent_active {
            self.notify_hierarchy_state_changed(id, enabled);
        }
    }

    /// A node's own enable toggle.
    pub fn is_enabled(&self, id: NodeId) -> Option<bool> {
        self.node_opt(id).map(Node::is_enabled)
    }

    /// Whether a node and every ancestor up to an active root are enabled.
    pub fn is_enabled_in_hierarchy(&self, id: NodeId) -> Option<bool> {
        self.node_opt(id).map(Node::is_enabled_in_hierarchy)
    }

    /// Turn recording of [`HierarchyEvent`]s on or off. Off by default.
    ///
    /// Turning recording off also drops any pending events, so a tree whose owner never
    /// drains the queue does not accumulate them.
    pub fn set_record_events(&mut self, on: bool) {
        self.record_events = on;
        if !on {
            self.events = Vec::new();
        }
    }

    /// Whether hierarchy mutations currently record [`HierarchyEvent`]s.
    pub fn records_events(&self) -> bool {
        self.record_events
    }

    /// Make a parentless node the top of a live hierarchy, or turn it back into an inert one.
    ///
    /// This is how a subtree detached with [`Tree::remove_child`] becomes live again. The
    /// hierarchy enable state of the node and its subtree is recomputed and broadcast.
    /// Nodes that have a parent are left unchanged.
    pub fn set_hierarchy_root(&mut self, id: NodeId, root: bool) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.parent.is_some() {
            log::warn!("ignored set_hierarchy_root({id:?}): node has a parent");
            return;
        }
        if node.is_hierarchy_root() == root {
            return;
        }
        node.flags.set(NodeFlags::HIERARCHY_ROOT, root);
        let active = root && node.is_enabled();
        log::debug!("node {id:?} hierarchy root = {root}");
        if node.is_enabled_in_hierarchy() != active {
            self.notify_hierarchy_state_changed(id, active);
        }
    }

    /// Notifications recorded since the last call to [`Tree::take_events`].
    ///
    /// Always empty unless recording was turned on with [`Tree::set_record_events`].
    pub fn events(&self) -> &[HierarchyEvent<NodeId>] {
        &self.events
    }

    /// Drain recorded notifications.
    pub fn take_events(&mut self) -> Vec<HierarchyEvent<NodeId>> {
        core::mem::take(&mut self.events)
    }

    // --- internals ---

    /// Access a live node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.node_opt(id).expect("dangling NodeId")
    }

    /// Access a live node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.node_opt_mut(id).expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.id.generation() != id.generation() {
            return None;
        }
        Some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.id.generation() != id.generation() {
            return None;
        }
        Some(n)
    }

    /// `enabled && enabled_in_hierarchy`: whether children of this node can be active.
    fn is_active(&self, id: NodeId) -> bool {
        let n = self.node(id);
        n.is_enabled() && n.is_enabled_in_hierarchy()
    }

    /// Validate an insert; returns `false` if it must not happen.
    fn check_insert(&self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        let is_self = parent == child;
        debug_assert!(!is_self, "cannot add node {child:?} as a child of itself");
        let is_cycle = !is_self && self.is_descendant_of(parent, child);
        debug_assert!(
            !is_cycle,
            "cannot add node {child:?} as a child of its own descendant {parent:?}"
        );
        if is_self || is_cycle {
            log::warn!("ignored insert of {child:?} under {parent:?}: would create a cycle");
            return false;
        }
        true
    }

    fn prepare_insert_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.check_insert(parent, child) {
            return false;
        }
        if let Some(old) = self.node(child).parent {
            self.detach(old, child, false);
        }
        true
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let siblings = &mut self.node_mut(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.on_insert_child(parent, child);
    }

    fn on_insert_child(&mut self, parent: NodeId, child: NodeId) {
        log::debug!("inserted {child:?} under {parent:?}");
        let parent_active = self.is_active(parent);
        let parent_frozen = self.node(parent).is_frozen();
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.flags.remove(NodeFlags::HIERARCHY_ROOT);

        let enabled_in_hierarchy = node.is_enabled() && parent_active;
        if node.is_enabled_in_hierarchy() != enabled_in_hierarchy {
            self.notify_hierarchy_state_changed(child, enabled_in_hierarchy);
        }

        self.update_graph_depth(child);
        self.dirtify_world(child);
        if parent_frozen {
            self.unfreeze_parent_to_root(child);
        }

        self.fire_on_hierarchy(child, parent, true);
        self.record(HierarchyEvent::ChildInserted { parent, child });
    }

    /// Unlink `child` from `parent`. With `stays_detached`, the child becomes an inert root.
    fn detach(&mut self, parent: NodeId, child: NodeId, stays_detached: bool) -> bool {
        let siblings = &mut self.node_mut(parent).children;
        let Some(pos) = siblings.iter().position(|c| *c == child) else {
            return false;
        };
        siblings.remove(pos);
        self.node_mut(child).parent = None;
        log::debug!("removed {child:?} from {parent:?}");

        if stays_detached {
            self.update_graph_depth(child);
            if self.node(child).is_enabled_in_hierarchy() {
                self.notify_hierarchy_state_changed(child, false);
            }
        }

        self.fire_on_hierarchy(child, parent, false);
        self.record(HierarchyEvent::ChildRemoved { parent, child });
        true
    }

    /// Record `Inserted`/`Removed` for `id` and the hierarchy variant for each descendant.
    fn fire_on_hierarchy(&mut self, id: NodeId, parent: NodeId, inserted: bool) {
        if !self.record_events {
            return;
        }
        self.events.push(if inserted {
            HierarchyEvent::Inserted { node: id, parent }
        } else {
            HierarchyEvent::Removed { node: id, parent }
        });
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            self.events.push(if inserted {
                HierarchyEvent::HierarchyInserted { node, parent }
            } else {
                HierarchyEvent::HierarchyRemoved { node, parent }
            });
            stack.extend(self.node(node).children.iter().rev().copied());
        }
    }

    fn record(&mut self, event: HierarchyEvent<NodeId>) {
        if self.record_events {
            self.events.push(event);
        }
    }

    fn update_graph_depth(&mut self, id: NodeId) {
        let depth = match self.node(id).parent {
            Some(p) => self.node(p).graph_depth + 1,
            None => 0,
        };
        self.node_mut(id).graph_depth = depth;
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            self.update_graph_depth(child);
        }
    }

    /// Set `enabled_in_hierarchy` on `id` and on every descendant reachable through
    /// individually enabled children.
    fn notify_hierarchy_state_changed(&mut self, id: NodeId, enabled: bool) {
        let node = self.node_mut(id);
        if node.is_enabled_in_hierarchy() != enabled {
            node.flags.set(NodeFlags::ENABLED_IN_HIERARCHY, enabled);
            self.record(HierarchyEvent::HierarchyStateChanged { node: id, enabled });
        }
        if enabled {
            // Disabled subtrees are skipped by the hierarchy sync; make sure the next one reaches it.
            self.node_mut(id).flags.remove(NodeFlags::FROZEN);
            self.unfreeze_parent_to_root(id);
        }
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            if self.node(child).is_enabled() {
                self.notify_hierarchy_state_changed(child, enabled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn chain(tree: &mut Tree, names: &[&str]) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut parent = None;
        for name in names {
            let id = if parent.is_none() {
                tree.create_root(name)
            } else {
                tree.create_node(name)
            };
            if let Some(p) = parent {
                tree.add_child(p, id);
            }
            ids.push(id);
            parent = Some(id);
        }
        ids
    }

    #[test]
    fn new_node_is_standalone_and_inert() {
        let mut tree = Tree::new();
        let n = tree.create_node("n");
        let node = tree.get(n).unwrap();
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
        assert!(node.is_enabled());
        assert!(!node.is_enabled_in_hierarchy());
        assert_eq!(node.graph_depth(), 0);

        let r = tree.create_root("r");
        assert!(tree.is_enabled_in_hierarchy(r).unwrap());
    }

    #[test]
    fn add_insert_and_order() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        let c = tree.create_node("c");
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.insert_child(root, c, 1);
        assert_eq!(tree.children(root), &[a, c, b]);
        // Out of range index clamps to the end.
        let d = tree.create_node("d");
        tree.insert_child(root, d, 99);
        assert_eq!(tree.children(root).last().copied(), Some(d));
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn graph_depth_tracks_reparenting() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["r", "a", "b", "c"]);
        assert_eq!(tree.graph_depth(ids[3]), Some(3));

        let other = tree.create_root("other");
        tree.reparent(ids[2], Some(other), None);
        assert_eq!(tree.graph_depth(ids[2]), Some(1));
        assert_eq!(tree.graph_depth(ids[3]), Some(2));

        tree.reparent(ids[2], None, None);
        assert_eq!(tree.graph_depth(ids[2]), Some(0));
        assert_eq!(tree.graph_depth(ids[3]), Some(1));
        assert_eq!(tree.parent(ids[2]), None);
    }

    #[test]
    fn adding_attached_node_moves_it() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        let b = tree.create_root("b");
        let n = tree.create_node("n");
        tree.add_child(a, n);
        tree.add_child(b, n);
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[n]);
        assert_eq!(tree.parent(n), Some(b));
    }

    #[test]
    #[should_panic(expected = "as a child of itself")]
    fn self_parenting_asserts() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        tree.add_child(a, a);
    }

    #[test]
    #[should_panic(expected = "as a child of its own descendant")]
    fn cycle_asserts() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["a", "b", "c"]);
        tree.add_child(ids[2], ids[0]);
    }

    #[test]
    fn rejected_cycle_leaves_tree_untouched() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["a", "b"]);
        let (a, b) = (ids[0], ids[1]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tree.add_child(b, a);
        }));
        // Debug builds assert; release builds ignore the call. Either way nothing moves.
        assert_eq!(result.is_err(), cfg!(debug_assertions));
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.children(a), &[b]);
        assert!(tree.children(b).is_empty());
    }

    #[test]
    fn remove_child_detaches_and_deactivates() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["r", "a", "b"]);
        assert!(tree.is_enabled_in_hierarchy(ids[2]).unwrap());
        assert!(tree.remove_child(ids[0], ids[1]));
        assert!(!tree.remove_child(ids[0], ids[1]), "already removed");
        assert_eq!(tree.parent(ids[1]), None);
        assert!(tree.children(ids[0]).is_empty());
        assert!(!tree.is_enabled_in_hierarchy(ids[1]).unwrap());
        assert!(!tree.is_enabled_in_hierarchy(ids[2]).unwrap());
        // Children of the removed node stay attached to it.
        assert_eq!(tree.parent(ids[2]), Some(ids[1]));
    }

    #[test]
    fn insert_events_order() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        let c = tree.create_node("c");
        tree.set_record_events(true);
        tree.add_child(a, b);
        tree.add_child(b, c);
        let _ = tree.take_events();

        tree.add_child(root, a);
        let events = tree.take_events();
        assert_eq!(
            events,
            [
                HierarchyEvent::HierarchyStateChanged { node: a, enabled: true },
                HierarchyEvent::HierarchyStateChanged { node: b, enabled: true },
                HierarchyEvent::HierarchyStateChanged { node: c, enabled: true },
                HierarchyEvent::Inserted { node: a, parent: root },
                HierarchyEvent::HierarchyInserted { node: b, parent: root },
                HierarchyEvent::HierarchyInserted { node: c, parent: root },
                HierarchyEvent::ChildInserted { parent: root, child: a },
            ]
        );
        assert!(tree.events().is_empty());
    }

    #[test]
    fn reparent_records_remove_then_insert_without_deactivating() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        let b = tree.create_root("b");
        let n = tree.create_node("n");
        tree.set_record_events(true);
        tree.add_child(a, n);
        let _ = tree.take_events();

        tree.reparent(n, Some(b), Some(0));
        let events = tree.take_events();
        assert_eq!(
            events,
            [
                HierarchyEvent::Removed { node: n, parent: a },
                HierarchyEvent::ChildRemoved { parent: a, child: n },
                HierarchyEvent::Inserted { node: n, parent: b },
                HierarchyEvent::ChildInserted { parent: b, child: n },
            ]
        );
        assert!(tree.is_enabled_in_hierarchy(n).unwrap());
    }

    #[test]
    fn enabled_propagation_skips_individually_disabled_children() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let n = tree.create_node("n");
        let on = tree.create_node("on");
        let off = tree.create_node("off");
        let grandchild = tree.create_node("grandchild");
        tree.add_child(root, n);
        tree.add_child(n, on);
        tree.add_child(n, off);
        tree.add_child(on, grandchild);
        tree.set_enabled(off, false);
        assert!(!tree.is_enabled_in_hierarchy(off).unwrap());

        tree.set_enabled(n, false);
        for id in [n, on, grandchild, off] {
            assert!(!tree.is_enabled_in_hierarchy(id).unwrap(), "{id:?} must be inactive");
        }

        tree.set_enabled(n, true);
        assert!(tree.is_enabled_in_hierarchy(n).unwrap());
        assert!(tree.is_enabled_in_hierarchy(on).unwrap());
        assert!(tree.is_enabled_in_hierarchy(grandchild).unwrap());
        assert!(
            !tree.is_enabled_in_hierarchy(off).unwrap(),
            "individually disabled child stays inactive"
        );

        tree.set_enabled(off, true);
        assert!(tree.is_enabled_in_hierarchy(off).unwrap());
    }

    #[test]
    fn enabling_under_inactive_parent_stays_inert() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let p = tree.create_node("p");
        let c = tree.create_node("c");
        tree.add_child(root, p);
        tree.add_child(p, c);
        tree.set_enabled(c, false);
        tree.set_enabled(p, false);
        tree.set_enabled(c, true);
        assert!(tree.is_enabled(c).unwrap());
        assert!(!tree.is_enabled_in_hierarchy(c).unwrap());
        tree.set_enabled(p, true);
        assert!(tree.is_enabled_in_hierarchy(c).unwrap());
    }

    #[test]
    fn inserting_disabled_node_keeps_subtree_inactive() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let n = tree.create_node("n");
        let c = tree.create_node("c");
        tree.add_child(n, c);
        tree.set_enabled(n, false);
        tree.add_child(root, n);
        assert!(!tree.is_enabled_in_hierarchy(n).unwrap());
        assert!(!tree.is_enabled_in_hierarchy(c).unwrap());
    }

    #[test]
    fn root_toggle() {
        let mut tree = Tree::new();
        let root = tree.create_root("root");
        let c = tree.create_node("c");
        tree.add_child(root, c);
        tree.set_enabled(root, false);
        assert!(!tree.is_enabled_in_hierarchy(c).unwrap());
        tree.set_enabled(root, true);
        assert!(tree.is_enabled_in_hierarchy(c).unwrap());
    }

    #[test]
    fn path_and_relations() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["house", "room", "lamp"]);
        assert_eq!(tree.path(ids[2]).as_deref(), Some("room/lamp"));
        assert_eq!(tree.path(ids[0]).as_deref(), Some(""));
        assert_eq!(tree.root_of(ids[2]), Some(ids[0]));
        assert!(tree.is_descendant_of(ids[2], ids[0]));
        assert!(tree.is_ancestor_of(ids[0], ids[2]));
        assert!(!tree.is_descendant_of(ids[0], ids[0]));
        assert!(!tree.is_ancestor_of(ids[2], ids[0]));
    }

    #[test]
    fn destroy_frees_subtree_and_reuses_slots() {
        let mut tree = Tree::new();
        let ids = chain(&mut tree, &["r", "a", "b"]);
        assert_eq!(tree.len(), 3);
        tree.destroy(ids[1]);
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_alive(ids[1]));
        assert!(!tree.is_alive(ids[2]));
        assert!(tree.children(ids[0]).is_empty());

        let fresh = tree.create_node("fresh");
        assert!(tree.is_alive(fresh));
        assert!(!tree.is_alive(ids[1]));
        assert!(!tree.is_alive(ids[2]));
        if fresh.0 == ids[1].0 {
            assert!(fresh.1 > ids[1].1, "generation must increase on reuse");
        }
        // Stale ids are ignored by setters and yield None from getters.
        tree.set_enabled(ids[2], false);
        tree.add_child(ids[0], ids[2]);
        assert_eq!(tree.is_enabled(ids[2]), None);
        assert!(tree.children(ids[0]).is_empty());
    }

    #[test]
    fn roots_lists_parentless_nodes() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        let b = tree.create_node("b");
        let c = tree.create_node("c");
        tree.add_child(a, b);
        let roots: Vec<NodeId> = tree.roots().collect();
        assert_eq!(roots, [a, c]);
        assert!(!tree.is_empty());
    }

    #[test]
    fn inserted_hierarchy_root_becomes_ordinary() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        let b = tree.create_root("b");
        tree.add_child(a, b);
        assert!(!tree.get(b).unwrap().is_hierarchy_root());
        tree.remove_child(a, b);
        assert!(!tree.is_enabled_in_hierarchy(b).unwrap());
    }

    #[test]
    fn events_are_not_recorded_by_default() {
        let mut tree = Tree::new();
        let a = tree.create_root("a");
        let b = tree.create_root("b");
        let n = tree.create_node("n");
        assert!(!tree.records_events());
        for frame in 0..100 {
            let target = if frame % 2 == 0 { a } else { b };
            tree.reparent(n, Some(target), None);
            tree.set_enabled(n, frame % 3 != 0);
            let _ = tree.sync_all();
        }
        assert!(tree.events().is_empty());

        tree.set_record_events(true);
        tree.reparent(n, Some(a), None);
        assert!(!tree.events().is_empty());
        tree.set_record_events(false);
        assert!(tree.events().is_empty(), "turning recording off drops pending events");
    }

    #[test]
    fn detached_subtree_can_become_live_again() {
        let mut tree = Tree::new();
        let r = tree.create_root("r");
        let n = tree.create_node("n");
        let c = tree.create_node("c");
        tree.add_child(r, n);
        tree.add_child(n, c);
        tree.remove_child(r, n);
        tree.set_enabled(n, false);
        tree.set_enabled(n, true);
        assert!(!tree.is_enabled_in_hierarchy(n).unwrap());

        tree.set_record_events(true);
        tree.set_hierarchy_root(n, true);
        assert!(tree.get(n).unwrap().is_hierarchy_root());
        assert!(tree.is_enabled_in_hierarchy(n).unwrap());
        assert!(tree.is_enabled_in_hierarchy(c).unwrap());
        assert_eq!(
            tree.take_events(),
            [
                HierarchyEvent::HierarchyStateChanged { node: n, enabled: true },
                HierarchyEvent::HierarchyStateChanged { node: c, enabled: true },
            ]
        );

        tree.set_hierarchy_root(n, false);
        assert!(!tree.is_enabled_in_hierarchy(c).unwrap());

        // Only parentless nodes can be hierarchy roots.
        tree.set_hierarchy_root(c, true);
        assert!(!tree.get(c).unwrap().is_hierarchy_root());
    }

    #[test]
    fn disabled_hierarchy_root_stays_inactive() {
        let mut tree = Tree::new();
        let n = tree.create_node("n");
        tree.set_enabled(n, false);
        tree.set_hierarchy_root(n, true);
        assert!(!tree.is_enabled_in_hierarchy(n).unwrap());
        tree.set_enabled(n, true);
        assert!(tree.is_enabled_in_hierarchy(n).unwrap());
    }
}
