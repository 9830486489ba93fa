// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node storage: local transform components, cached matrices, flags, and links.

use alloc::string::String;
use alloc::vec::Vec;
use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::tags::Tags;
use crate::types::{NodeFlags, NodeId};

/// A node in the tree.
///
/// Nodes live in [`Tree`](crate::Tree) slots and are only mutated through the tree, which
/// keeps the cached matrices and flags consistent. This type is the read-only view handed to
/// search predicates and returned by [`Tree::get`](crate::Tree::get).
///
/// The local transform components are authoritative. Matrices are caches; the local and
/// world matrices are not exposed here because they may be stale. Use
/// [`Tree::local_transform`](crate::Tree::local_transform) and
/// [`Tree::world_transform`](crate::Tree::world_transform) to read them synchronized.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) tags: Tags,

    pub(crate) local_position: Vec3,
    pub(crate) local_rotation: Quat,
    pub(crate) local_scale: Vec3,

    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,
    pub(crate) normal_matrix: Mat3,

    pub(crate) flags: NodeFlags,
    pub(crate) version: u32,
    // +1 or -1; 0 means recompute from the world matrix.
    pub(crate) world_scale_sign: i8,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) graph_depth: u32,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String) -> Self {
        Self {
            id,
            name,
            tags: Tags::new(),
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            flags: NodeFlags::ENABLED,
            version: 0,
            world_scale_sign: 0,
            parent: None,
            children: Vec::new(),
            graph_depth: 0,
        }
    }

    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name. Not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags attached to this node.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Position relative to the parent.
    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    /// Rotation relative to the parent.
    pub fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    /// Scale relative to the parent.
    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    /// XYZ Euler angles in radians, derived from [`Node::local_rotation`].
    pub fn local_euler_angles(&self) -> Vec3 {
        let (x, y, z) = self.local_rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Current state flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// The node's own enable toggle.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::ENABLED)
    }

    /// True iff this node and every ancestor up to an active root are enabled.
    pub fn is_enabled_in_hierarchy(&self) -> bool {
        self.flags.contains(NodeFlags::ENABLED_IN_HIERARCHY)
    }

    /// Whether scale compensation is on for this node.
    pub fn scale_compensation(&self) -> bool {
        self.flags.contains(NodeFlags::SCALE_COMPENSATION)
    }

    /// Whether the node was created as the top of a live hierarchy.
    pub fn is_hierarchy_root(&self) -> bool {
        self.flags.contains(NodeFlags::HIERARCHY_ROOT)
    }

    /// Whether the last hierarchy sync found this subtree unchanged.
    pub fn is_frozen(&self) -> bool {
        self.flags.contains(NodeFlags::FROZEN)
    }

    /// Whether either transform cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.flags.intersects(NodeFlags::DIRTY_LOCAL | NodeFlags::DIRTY_WORLD)
    }

    /// Counter bumped whenever the world transform is invalidated or recomputed.
    ///
    /// Collaborators caching bounds or other world-derived data compare this against the
    /// value they last saw.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Parent handle, or `None` for a root or detached node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered child handles.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of ancestor links to the nearest root.
    pub fn graph_depth(&self) -> u32 {
        self.graph_depth
    }

    pub(crate) fn compose_local(&mut self) {
        self.local_matrix = Mat4::from_scale_rotation_translation(
            self.local_scale,
            self.local_rotation,
            self.local_position,
        );
        self.flags.remove(NodeFlags::DIRTY_LOCAL);
    }

    /// Record that the world matrix changed (or will change).
    pub(crate) fn touch_world(&mut self) {
        self.flags.insert(NodeFlags::DIRTY_NORMAL);
        self.world_scale_sign = 0;
        self.version = self.version.wrapping_add(1);
    }
}

/// Translation column of an affine matrix.
pub(crate) fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Per-axis scale magnitude of an affine matrix (column lengths).
///
/// Meaningful only for matrices without skew. Negative scale shows up as a positive magnitude;
/// see [`scale_sign_of`].
pub(crate) fn scale_of(m: &Mat4) -> Vec3 {
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// Rotation of an affine matrix with scale divided out of each basis column.
///
/// Degenerate (zero-length) columns yield a deterministic but meaningless quaternion.
pub(crate) fn rotation_of(m: &Mat4) -> Quat {
    let basis = Mat3::from_cols(
        m.x_axis.truncate().normalize_or_zero(),
        m.y_axis.truncate().normalize_or_zero(),
        m.z_axis.truncate().normalize_or_zero(),
    );
    Quat::from_mat3(&basis)
}

/// `-1` if the basis is mirrored (negative determinant), `1` otherwise.
pub(crate) fn scale_sign_of(m: &Mat4) -> i8 {
    let x = m.x_axis.truncate();
    let y = m.y_axis.truncate();
    let z = m.z_axis.truncate();
    if x.cross(y).dot(z) < 0.0 { -1 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn decomposition_recovers_trs() {
        let rot = Quat::from_rotation_y(FRAC_PI_2);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 4.0),
            rot,
            Vec3::new(1.0, -1.0, 5.0),
        );
        assert!(translation_of(&m).abs_diff_eq(Vec3::new(1.0, -1.0, 5.0), 1e-5));
        assert!(scale_of(&m).abs_diff_eq(Vec3::new(2.0, 3.0, 4.0), 1e-5));
        assert!(rotation_of(&m).abs_diff_eq(rot, 1e-5));
        assert_eq!(scale_sign_of(&m), 1);
    }

    #[test]
    fn mirrored_basis_has_negative_sign() {
        let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(scale_sign_of(&m), -1);
        assert_eq!(scale_of(&m), Vec3::ONE);
        let m = Mat4::from_scale(Vec3::new(-1.0, -1.0, 1.0));
        assert_eq!(scale_sign_of(&m), 1, "two flips cancel out");
    }

    #[test]
    fn degenerate_scale_does_not_panic() {
        let m = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(scale_of(&m).x, 0.0);
        let _ = rotation_of(&m);
    }

    #[test]
    fn local_euler_follows_rotation() {
        let mut n = Node::new(NodeId::new(0, 1), String::from("n"));
        n.local_rotation = Quat::from_euler(EulerRot::XYZ, 0.1, 0.2, 0.3);
        assert!(n.local_euler_angles().abs_diff_eq(Vec3::new(0.1, 0.2, 0.3), 1e-5));
    }
}
