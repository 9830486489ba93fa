// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Search and traversal over a subtree.
//!
//! All traversals are depth-first pre-order: a node is visited before its children, and
//! children in their stored order. Misses are empty results or `None`.

use alloc::vec::Vec;

use crate::node::Node;
use crate::tags::TagQuery;
use crate::tree::Tree;
use crate::types::{NodeId, Property};

impl Property<'_> {
    /// Returns true if `node` has this property value.
    pub fn matches(&self, node: &Node) -> bool {
        match *self {
            Self::Name(name) => node.name() == name,
            Self::Tag(tag) => node.tags().contains(tag),
            Self::Enabled(v) => node.is_enabled() == v,
            Self::EnabledInHierarchy(v) => node.is_enabled_in_hierarchy() == v,
            Self::ScaleCompensation(v) => node.scale_compensation() == v,
            Self::GraphDepth(d) => node.graph_depth() == d,
        }
    }
}

/// Pre-order iterator over a subtree, root included.
///
/// Created by [`Tree::subtree`].
#[derive(Debug)]
pub struct Subtree<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Subtree<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

impl Tree {
    /// Iterate `root` and its descendants in pre-order. Empty for a stale `root`.
    pub fn subtree(&self, root: NodeId) -> Subtree<'_> {
        let mut stack = Vec::new();
        if self.is_alive(root) {
            stack.push(root);
        }
        Subtree { tree: self, stack }
    }

    /// Call `f` on `root` and every descendant in pre-order.
    pub fn for_each(&self, root: NodeId, mut f: impl FnMut(&Node)) {
        for node in self.subtree(root) {
            f(node);
        }
    }

    /// Every node in the subtree (root included) matching `predicate`.
    pub fn find(&self, root: NodeId, mut predicate: impl FnMut(&Node) -> bool) -> Vec<NodeId> {
        self.subtree(root)
            .filter(|&n| predicate(n))
            .map(Node::id)
            .collect()
    }

    /// Every node in the subtree (root included) with the given property value.
    ///
    /// ```
    /// use understory_transform_tree::{Property, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.create_root("root");
    /// let a = tree.create_node("a");
    /// let b = tree.create_node("b");
    /// tree.add_child(root, a);
    /// tree.add_child(a, b);
    /// tree.set_enabled(a, false);
    ///
    /// assert_eq!(tree.find_by_property(root, Property::GraphDepth(1)), [a]);
    /// assert_eq!(tree.find_by_property(root, Property::EnabledInHierarchy(false)), [a, b]);
    /// ```
    pub fn find_by_property(&self, root: NodeId, property: Property<'_>) -> Vec<NodeId> {
        self.find(root, |n| property.matches(n))
    }

    /// First node in pre-order (root included) matching `predicate`.
    pub fn find_one(
        &self,
        root: NodeId,
        mut predicate: impl FnMut(&Node) -> bool,
    ) -> Option<NodeId> {
        self.subtree(root).find(|&n| predicate(n)).map(Node::id)
    }

    /// First node in pre-order (root included) with the given property value.
    pub fn find_one_by_property(&self, root: NodeId, property: Property<'_>) -> Option<NodeId> {
        self.find_one(root, |n| property.matches(n))
    }

    /// First node in pre-order (root included) with exactly this name.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find_one(root, |n| n.name() == name)
    }

    /// Walk down from `root` matching one `/`-separated segment per level against the
    /// names of the immediate children.
    ///
    /// The first child with a matching name is taken at each level. An empty path
    /// returns `root` itself (the inverse of [`Tree::path`], which is empty for a root).
    /// Any other empty segment, as in `"room/"` or `"room//lamp"`, must match a child
    /// named `""`, so a trailing slash normally finds nothing.
    ///
    /// ```
    /// use understory_transform_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let house = tree.create_root("house");
    /// let room = tree.create_node("room");
    /// let lamp = tree.create_node("lamp");
    /// tree.add_child(house, room);
    /// tree.add_child(room, lamp);
    ///
    /// assert_eq!(tree.find_by_path(house, "room/lamp"), Some(lamp));
    /// assert_eq!(tree.find_by_path(house, "room/missing"), None);
    /// ```
    pub fn find_by_path(&self, root: NodeId, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return self.is_alive(root).then_some(root);
        }
        self.find_by_path_segments(root, path.split('/'))
    }

    /// Like [`Tree::find_by_path`] with the path already split into names.
    pub fn find_by_path_segments<'a>(
        &self,
        root: NodeId,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Option<NodeId> {
        let mut current = self.node_opt(root)?;
        for segment in segments {
            let next = current
                .children
                .iter()
                .map(|c| self.node(*c))
                .find(|c| c.name() == segment)?;
            current = next;
        }
        Some(current.id)
    }

    /// Descendants of `root` (root excluded) whose tags satisfy `query`.
    ///
    /// A node matches when any term of `query` matches; see [`Tags::has`](crate::Tags::has).
    pub fn find_by_tag(&self, root: NodeId, query: &[TagQuery<'_>]) -> Vec<NodeId> {
        self.subtree(root)
            .skip(1)
            .filter(|n| n.tags().has(query))
            .map(Node::id)
            .collect()
    }
}
