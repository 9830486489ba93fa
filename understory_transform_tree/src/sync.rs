// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform accessors and synchronization.
//!
//! ## Overview
//!
//! Local transform components are authoritative; local and world matrices are caches guarded
//! by [`NodeFlags::DIRTY_LOCAL`] and [`NodeFlags::DIRTY_WORLD`].
//!
//! - Writing a local component marks the node local-dirty and its subtree world-dirty
//!   (stopping at descendants already world-dirty) and unfreezes the ancestor chain.
//! - Reading a world-space quantity resolves the parent chain first, then recomputes only
//!   the stale matrices of the requested node.
//! - [`Tree::sync_hierarchy`] is the eager top-down pass. It marks visited nodes
//!   [`NodeFlags::FROZEN`] and skips frozen and disabled subtrees on later passes.
//!
//! ## Scale compensation
//!
//! A node with [`NodeFlags::SCALE_COMPENSATION`] takes its inherited scale from the nearest
//! ancestor that does not compensate (walking up from the parent, stopping at the root),
//! rather than from its parent. Rotation is always inherited from the parent. Its position is
//! placed with the parent's world matrix, or, when the parent compensates as well, with a
//! matrix built from the parent's world translation and rotation and the parent's
//! compensated scale.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::node::{rotation_of, scale_of, scale_sign_of, translation_of};
use crate::tree::Tree;
use crate::types::{NodeFlags, NodeId};

/// Summary of one [`Tree::sync_hierarchy`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Nodes entered by the pass (enabled and not frozen).
    pub visited: usize,
    /// Nodes whose local or world matrix was recomputed.
    pub recomputed: usize,
}

impl Tree {
    // --- local space ---

    /// Set the position relative to the parent.
    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local_position = position;
            self.dirtify_local(id);
        }
    }

    /// Scalar form of [`Tree::set_local_position`].
    pub fn set_local_position_xyz(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.set_local_position(id, Vec3::new(x, y, z));
    }

    /// Set the rotation relative to the parent.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local_rotation = rotation;
            self.dirtify_local(id);
        }
    }

    /// Scalar form of [`Tree::set_local_rotation`].
    pub fn set_local_rotation_xyzw(&mut self, id: NodeId, x: f32, y: f32, z: f32, w: f32) {
        self.set_local_rotation(id, Quat::from_xyzw(x, y, z, w));
    }

    /// Set the scale relative to the parent.
    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local_scale = scale;
            self.dirtify_local(id);
        }
    }

    /// Scalar form of [`Tree::set_local_scale`].
    pub fn set_local_scale_xyz(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.set_local_scale(id, Vec3::new(x, y, z));
    }

    /// Set the local rotation from XYZ Euler angles in radians.
    pub fn set_local_euler_angles(&mut self, id: NodeId, angles: Vec3) {
        self.set_local_rotation(id, Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z));
    }

    /// Scalar form of [`Tree::set_local_euler_angles`].
    pub fn set_local_euler_angles_xyz(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.set_local_euler_angles(id, Vec3::new(x, y, z));
    }

    /// Position relative to the parent.
    pub fn local_position(&self, id: NodeId) -> Option<Vec3> {
        self.node_opt(id).map(|n| n.local_position)
    }

    /// Rotation relative to the parent.
    pub fn local_rotation(&self, id: NodeId) -> Option<Quat> {
        self.node_opt(id).map(|n| n.local_rotation)
    }

    /// Scale relative to the parent.
    pub fn local_scale(&self, id: NodeId) -> Option<Vec3> {
        self.node_opt(id).map(|n| n.local_scale)
    }

    /// Local rotation as XYZ Euler angles in radians.
    pub fn local_euler_angles(&self, id: NodeId) -> Option<Vec3> {
        self.node_opt(id).map(|n| n.local_euler_angles())
    }

    /// Local matrix, recomposed from position, rotation, and scale if stale.
    pub fn local_transform(&mut self, id: NodeId) -> Option<Mat4> {
        let n = self.node_opt_mut(id)?;
        if n.flags.contains(NodeFlags::DIRTY_LOCAL) {
            n.compose_local();
        }
        Some(n.local_matrix)
    }

    /// Move by `offset` in local (rotated) space.
    pub fn translate_local(&mut self, id: NodeId, offset: Vec3) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local_position += n.local_rotation * offset;
            self.dirtify_local(id);
        }
    }

    /// Rotate by `rotation` after the existing local rotation.
    pub fn rotate_local(&mut self, id: NodeId, rotation: Quat) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local_rotation *= rotation;
            self.dirtify_local(id);
        }
    }

    /// Toggle scale compensation. The node's subtree becomes world-dirty.
    pub fn set_scale_compensation(&mut self, id: NodeId, on: bool) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.scale_compensation() == on {
            return;
        }
        n.flags.set(NodeFlags::SCALE_COMPENSATION, on);
        self.dirtify_world(id);
    }

    // --- world space ---

    /// World matrix, synchronizing stale ancestors and the node itself.
    pub fn world_transform(&mut self, id: NodeId) -> Option<Mat4> {
        self.is_alive(id).then(|| self.synced_world(id))
    }

    /// World position.
    pub fn position(&mut self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|m| translation_of(&m))
    }

    /// World rotation, with scale divided out of the world matrix.
    pub fn rotation(&mut self, id: NodeId) -> Option<Quat> {
        self.world_transform(id).map(|m| rotation_of(&m))
    }

    /// World scale magnitudes.
    ///
    /// Only meaningful when the world matrix has no skew. Mirroring is reported by
    /// [`Tree::world_scale_sign`], not by negative components.
    pub fn scale(&mut self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|m| scale_of(&m))
    }

    /// World rotation as XYZ Euler angles in radians.
    pub fn euler_angles(&mut self, id: NodeId) -> Option<Vec3> {
        let (x, y, z) = self.rotation(id)?.to_euler(EulerRot::XYZ);
        Some(Vec3::new(x, y, z))
    }

    /// Set the world position; the local position is derived through the parent's inverse world matrix.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        let Some(parent) = self.node_opt(id).map(|n| n.parent) else {
            return;
        };
        let local = match parent {
            Some(p) => self.synced_world(p).inverse().transform_point3(position),
            None => position,
        };
        self.set_local_position(id, local);
    }

    /// Scalar form of [`Tree::set_position`].
    pub fn set_position_xyz(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.set_position(id, Vec3::new(x, y, z));
    }

    /// Set the world rotation; the local rotation is derived through the parent's inverse world rotation.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        let Some(parent) = self.node_opt(id).map(|n| n.parent) else {
            return;
        };
        let local = match parent {
            Some(p) => self.world_rotation_of(p).inverse() * rotation,
            None => rotation,
        };
        self.set_local_rotation(id, local);
    }

    /// Scalar form of [`Tree::set_rotation`].
    pub fn set_rotation_xyzw(&mut self, id: NodeId, x: f32, y: f32, z: f32, w: f32) {
        self.set_rotation(id, Quat::from_xyzw(x, y, z, w));
    }

    /// Set the world rotation from XYZ Euler angles in radians.
    pub fn set_euler_angles(&mut self, id: NodeId, angles: Vec3) {
        self.set_rotation(id, Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z));
    }

    /// Scalar form of [`Tree::set_euler_angles`].
    pub fn set_euler_angles_xyz(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        self.set_euler_angles(id, Vec3::new(x, y, z));
    }

    /// Move by `offset` in world space.
    pub fn translate(&mut self, id: NodeId, offset: Vec3) {
        if let Some(position) = self.position(id) {
            self.set_position(id, position + offset);
        }
    }

    /// Apply a world-space rotation on top of the current world rotation.
    pub fn rotate(&mut self, id: NodeId, rotation: Quat) {
        let Some((parent, current)) = self.node_opt(id).map(|n| (n.parent, n.local_rotation))
        else {
            return;
        };
        let local = match parent {
            None => rotation * current,
            Some(p) => {
                let world = self.world_rotation_of(id);
                self.world_rotation_of(p).inverse() * rotation * world
            }
        };
        self.set_local_rotation(id, local);
    }

    /// Orient the node so its forward axis (-Z) points at `target`, with `up` as the up hint.
    pub fn look_at(&mut self, id: NodeId, target: Vec3, up: Vec3) {
        let Some(eye) = self.position(id) else {
            return;
        };
        let z = (eye - target).normalize_or_zero();
        let x = up.cross(z).normalize_or_zero();
        let y = z.cross(x);
        self.set_rotation(id, Quat::from_mat3(&Mat3::from_cols(x, y, z)));
    }

    /// World forward direction (-Z), normalized.
    pub fn forward(&mut self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|m| -m.z_axis.truncate().normalize_or_zero())
    }

    /// World right direction (+X), normalized.
    pub fn right(&mut self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|m| m.x_axis.truncate().normalize_or_zero())
    }

    /// World up direction (+Y), normalized.
    pub fn up(&mut self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|m| m.y_axis.truncate().normalize_or_zero())
    }

    /// Inverse-transpose of the world matrix's upper 3×3, for transforming normals.
    pub fn normal_matrix(&mut self, id: NodeId) -> Option<Mat3> {
        let world = self.world_transform(id)?;
        let n = self.node_mut(id);
        if n.flags.contains(NodeFlags::DIRTY_NORMAL) {
            n.normal_matrix = Mat3::from_mat4(world).inverse().transpose();
            n.flags.remove(NodeFlags::DIRTY_NORMAL);
        }
        Some(n.normal_matrix)
    }

    /// `-1.0` if the world transform is mirrored (negative determinant), `1.0` otherwise.
    pub fn world_scale_sign(&mut self, id: NodeId) -> Option<f32> {
        let world = self.world_transform(id)?;
        let n = self.node_mut(id);
        if n.world_scale_sign == 0 {
            n.world_scale_sign = scale_sign_of(&world);
        }
        Some(f32::from(n.world_scale_sign))
    }

    /// Version counter of a node; see [`Node::version`](crate::Node::version).
    pub fn version(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id).map(|n| n.version)
    }

    // --- hierarchy sync ---

    /// Eagerly synchronize `id` and its subtree.
    ///
    /// Disabled and frozen nodes are skipped together with their subtrees. Every visited
    /// node is marked frozen until a later mutation touches it or its subtree.
    pub fn sync_hierarchy(&mut self, id: NodeId) -> SyncStats {
        let mut stats = SyncStats::default();
        if self.is_alive(id) {
            self.sync_hierarchy_recursive(id, &mut stats);
        }
        log::trace!(
            "sync_hierarchy({id:?}): visited {}, recomputed {}",
            stats.visited,
            stats.recomputed
        );
        stats
    }

    /// Run [`Tree::sync_hierarchy`] on every hierarchy root; the once-per-frame entry point.
    ///
    /// Parentless nodes that are not hierarchy roots (standalone or detached subtrees) are
    /// inert and skipped. Their world transforms are still resolved lazily on read, or by
    /// calling [`Tree::sync_hierarchy`] on them directly.
    pub fn sync_all(&mut self) -> SyncStats {
        let roots: alloc::vec::Vec<NodeId> = self
            .roots()
            .filter(|&id| self.node(id).is_hierarchy_root())
            .collect();
        let mut stats = SyncStats::default();
        for root in roots {
            self.sync_hierarchy_recursive(root, &mut stats);
        }
        stats
    }

    fn sync_hierarchy_recursive(&mut self, id: NodeId, stats: &mut SyncStats) {
        let node = self.node_mut(id);
        if !node.is_enabled() || node.is_frozen() {
            return;
        }
        node.flags.insert(NodeFlags::FROZEN);
        stats.visited += 1;
        if node.is_dirty() {
            self.sync_node(id);
            stats.recomputed += 1;
        }
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            self.sync_hierarchy_recursive(child, stats);
        }
    }

    // --- internals ---

    /// World matrix of a live node, resolving its parent chain first.
    pub(crate) fn synced_world(&mut self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        if !node.is_dirty() {
            return node.world_matrix;
        }
        let parent = node.parent;
        if let Some(p) = parent {
            self.synced_world(p);
        }
        self.sync_node(id);
        self.node(id).world_matrix
    }

    pub(crate) fn world_rotation_of(&mut self, id: NodeId) -> Quat {
        rotation_of(&self.synced_world(id))
    }

    /// Recompute stale matrices of one node. The parent's world matrix must be current.
    fn sync_node(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.flags.contains(NodeFlags::DIRTY_LOCAL) {
            node.compose_local();
        }
        if !node.flags.contains(NodeFlags::DIRTY_WORLD) {
            return;
        }
        let parent = node.parent;
        let local = node.local_matrix;
        let compensate = node.scale_compensation();

        let world = match parent {
            None => local,
            Some(p) if !compensate => self.node(p).world_matrix * local,
            Some(p) => self.scale_compensated_world(id, p),
        };

        let node = self.node_mut(id);
        node.world_matrix = world;
        node.flags.remove(NodeFlags::DIRTY_WORLD);
        node.touch_world();
    }

    fn scale_compensated_world(&self, id: NodeId, parent: NodeId) -> Mat4 {
        let node = self.node(id);

        let mut source = self.node(parent);
        while source.scale_compensation() {
            match source.parent {
                Some(p) => source = self.node(p),
                None => break,
            }
        }
        let inherited_scale = scale_of(&source.world_matrix);
        let scale = inherited_scale * node.local_scale;

        let parent = self.node(parent);
        let parent_rotation = rotation_of(&parent.world_matrix);
        let rotation = parent_rotation * node.local_rotation;

        let placement = if parent.scale_compensation() {
            Mat4::from_scale_rotation_translation(
                inherited_scale * parent.local_scale,
                parent_rotation,
                translation_of(&parent.world_matrix),
            )
        } else {
            parent.world_matrix
        };
        let position = placement.transform_point3(node.local_position);

        Mat4::from_scale_rotation_translation(scale, rotation, position)
    }

    pub(crate) fn dirtify_local(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.flags.contains(NodeFlags::DIRTY_LOCAL) {
            return;
        }
        node.flags.insert(NodeFlags::DIRTY_LOCAL);
        if !node.flags.contains(NodeFlags::DIRTY_WORLD) {
            self.dirtify_world(id);
        }
    }

    pub(crate) fn dirtify_world(&mut self, id: NodeId) {
        if !self.node(id).flags.contains(NodeFlags::DIRTY_WORLD) {
            self.unfreeze_parent_to_root(id);
        }
        self.dirtify_world_internal(id);
    }

    fn dirtify_world_internal(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if !node.flags.contains(NodeFlags::DIRTY_WORLD) {
            node.flags.remove(NodeFlags::FROZEN);
            node.flags.insert(NodeFlags::DIRTY_WORLD);
            for i in 0..self.node(id).children.len() {
                let child = self.node(id).children[i];
                if !self.node(child).flags.contains(NodeFlags::DIRTY_WORLD) {
                    self.dirtify_world_internal(child);
                }
            }
        }
        self.node_mut(id).touch_world();
    }

    pub(crate) fn unfreeze_parent_to_root(&mut self, id: NodeId) {
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            let n = self.node_mut(p);
            n.flags.remove(NodeFlags::FROZEN);
            parent = n.parent;
        }
    }
}
