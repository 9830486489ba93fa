// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_transform_tree --heading-base-level=0

//! Understory Transform Tree: an arena-backed 3D node hierarchy with cached transforms.
//!
//! Understory Transform Tree is the spatial core of a real-time 3D scene: a tree of nodes, each
//! carrying a local transform (position, rotation, scale) and a derived world transform that
//! renderers and physics bindings read every frame.
//!
//! - Represents one or more hierarchies of named, tagged nodes stored in a single [`Tree`] arena.
//! - Recomputes local and world matrices lazily, driven by dirty flags, from the nearest clean ancestor down.
//! - Provides an eager [`Tree::sync_hierarchy`] pass that skips frozen (unchanged) and disabled subtrees.
//! - Propagates enable state through the hierarchy and records [`HierarchyEvent`]s for collaborators.
//! - Supports opt-in scale compensation, decoupling a node's scale from its ancestors' scale.
//!
//! ## Not a renderer or a scene format
//!
//! This crate does not draw, cull, animate, or (de)serialize anything. Collaborators build trees
//! with [`Tree::add_child`] and the local setters in parent-before-child order, call
//! [`Tree::sync_all`] once per frame, then read world-space data with [`Tree::world_transform`],
//! [`Tree::position`], [`Tree::rotation`], and [`Tree::scale`].
//!
//! ## API overview
//!
//! - [`Tree`]: arena owning all nodes; every operation goes through it.
//! - [`NodeId`]: generational handle of a node.
//! - [`Node`]: read-only view of a node, handed to search predicates.
//! - [`NodeFlags`]: enable, scale compensation, dirty, and frozen state.
//! - [`Tags`] / [`TagQuery`]: string tags and OR-of-AND tag queries.
//! - [`Property`]: typed property/value pair for field-based search.
//! - [`HierarchyEvent`]: opt-in notifications ([`Tree::set_record_events`]) drained with [`Tree::take_events`].
//! - [`SyncStats`]: what a hierarchy sync pass visited and recomputed.
//!
//! Key operations:
//! - [`Tree::create_root`] / [`Tree::create_node`] → [`NodeId`]
//! - [`Tree::add_child`], [`Tree::insert_child`], [`Tree::add_child_and_save_transform`],
//!   [`Tree::remove_child`], [`Tree::reparent`]
//! - [`Tree::set_local_position`] / [`Tree::set_position`] and the rotation, scale, and Euler variants
//! - [`Tree::set_enabled`], [`Tree::set_scale_compensation`], [`Tree::set_hierarchy_root`]
//! - [`Tree::find`], [`Tree::find_by_name`], [`Tree::find_by_path`], [`Tree::find_by_tag`], [`Tree::for_each`]
//!
//! ## Invariants
//!
//! - A clean node's local matrix equals `translation * rotation * scale` of its components.
//! - A clean node's world matrix equals `parent_world * local` (or the scale-compensated
//!   composition when [`NodeFlags::SCALE_COMPENSATION`] is set).
//! - A node is enabled in hierarchy iff it is enabled and its parent is enabled in hierarchy;
//!   a parentless node only if it is a hierarchy root ([`Tree::create_root`], [`Tree::set_hierarchy_root`]).
//! - `graph_depth` is `0` for parentless nodes and `parent + 1` otherwise.
//! - Inserting a node under itself or under one of its descendants is a caller bug:
//!   it trips a debug assertion and is ignored in release builds.
//!
//! ## Threading
//!
//! Everything is synchronous. Lazy world queries take `&mut Tree` because they fill caches.
//! Hosts that share a tree across threads must serialize access to it.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use understory_transform_tree::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.create_root("root");
//! let arm = tree.create_node("arm");
//! let hand = tree.create_node("hand");
//! tree.add_child(root, arm);
//! tree.add_child(arm, hand);
//!
//! tree.set_local_scale(root, Vec3::splat(2.0));
//! tree.set_local_position(arm, Vec3::new(1.0, 0.0, 0.0));
//! tree.set_local_position(hand, Vec3::new(0.0, 1.0, 0.0));
//!
//! // Lazy: resolves root and arm on the way.
//! assert_eq!(tree.position(hand), Some(Vec3::new(2.0, 2.0, 0.0)));
//!
//! // Eager per-frame pass; a second pass finds everything frozen.
//! let _ = tree.sync_all();
//! assert_eq!(tree.sync_all().visited, 0);
//!
//! // Keep the hand where it is while moving it under the root.
//! tree.add_child_and_save_transform(root, hand);
//! assert_eq!(tree.position(hand), Some(Vec3::new(2.0, 2.0, 0.0)));
//! assert_eq!(tree.local_position(hand), Some(Vec3::new(1.0, 1.0, 0.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod event;
mod node;
mod query;
mod sync;
mod tags;
mod tree;
mod types;

pub use event::HierarchyEvent;
pub use node::Node;
pub use query::Subtree;
pub use sync::SyncStats;
pub use tags::{TagQuery, Tags};
pub use tree::Tree;
pub use types::{NodeFlags, NodeId, Property};
