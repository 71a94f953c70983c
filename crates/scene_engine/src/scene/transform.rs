//! Hierarchical transforms with lazily cached matrices
//!
//! Transforms live in an arena owned by the [`Scene`](super::Scene). Parent
//! and child links are plain [`TransformId`] handles: a transform never owns
//! its parent or its children, so removing one is a matter of unlinking
//! handles.
//!
//! ## Caching
//!
//! Every node caches its local matrix, global matrix, global TRS inverse and
//! global rotation. Mutations invalidate eagerly and top-down (the node and
//! its whole subtree); recomputation happens lazily on the next read. Reads
//! only need `&Transforms` because the caches use interior mutability.
//!
//! ## Coordinate system
//! - Y-up, right-handed
//! - local forward is -Z

use std::cell::Cell;

use slotmap::SlotMap;

use super::error::SceneError;
use crate::foundation::collections::{GameObjectId, TransformId};
use crate::foundation::math::{Mat4, Mat4Ext, Pose, Quat, Vec3, Point3};

const DEGENERATE_EPSILON: f32 = 1e-6;

/// A single node of the transform hierarchy
#[derive(Debug)]
pub struct TransformNode {
    game_object: GameObjectId,
    pose: Pose,
    parent: Option<TransformId>,
    children: Vec<TransformId>,

    local_matrix: Cell<Option<Mat4>>,
    global_matrix: Cell<Option<Mat4>>,
    global_inverse: Cell<Option<Mat4>>,
    global_rotation: Cell<Option<Quat>>,
}

impl TransformNode {
    fn new(game_object: GameObjectId) -> Self {
        Self {
            game_object,
            pose: Pose::identity(),
            parent: None,
            children: Vec::new(),
            local_matrix: Cell::new(None),
            global_matrix: Cell::new(None),
            global_inverse: Cell::new(None),
            global_rotation: Cell::new(None),
        }
    }

    fn invalidate_global(&self) {
        self.global_matrix.set(None);
        self.global_inverse.set(None);
        self.global_rotation.set(None);
    }
}

/// Arena of all transforms in a scene
#[derive(Debug, Default)]
pub struct Transforms {
    nodes: SlotMap<TransformId, TransformNode>,
}

impl Transforms {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a parentless identity transform for a GameObject
    pub(crate) fn insert(&mut self, game_object: GameObjectId) -> TransformId {
        self.nodes.insert(TransformNode::new(game_object))
    }

    /// Remove a transform, unlinking it from its parent and orphaning its
    /// children (they become roots; their caches are invalidated).
    pub(crate) fn remove(&mut self, id: TransformId) -> Option<TransformNode> {
        let parent = self.nodes.get(id)?.parent;
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|c| *c != id);
            }
        }

        let node = self.nodes.remove(id)?;
        for &child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
            self.mark_dirty(child);
        }
        Some(node)
    }

    /// Number of live transforms
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live transform
    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Read view of a transform
    pub fn get(&self, id: TransformId) -> Option<TransformRef<'_>> {
        self.nodes.get(id).map(|node| TransformRef {
            transforms: self,
            id,
            node,
        })
    }

    fn node(&self, id: TransformId) -> Result<&TransformNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::StaleTransform(id))
    }

    fn node_mut(&mut self, id: TransformId) -> Result<&mut TransformNode, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::StaleTransform(id))
    }

    /// Set the local position
    pub fn set_local_position(&mut self, id: TransformId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.pose.position = position;
        self.local_changed(id);
        Ok(())
    }

    /// Set the local rotation
    pub fn set_local_rotation(&mut self, id: TransformId, rotation: Quat) -> Result<(), SceneError> {
        self.node_mut(id)?.pose.rotation = rotation;
        self.local_changed(id);
        Ok(())
    }

    /// Set the local rotation from Euler angles (radians; roll, pitch, yaw
    /// about X, Y, Z)
    pub fn set_local_rotation_euler(&mut self, id: TransformId, euler: Vec3) -> Result<(), SceneError> {
        self.set_local_rotation(id, Quat::from_euler_angles(euler.x, euler.y, euler.z))
    }

    /// Set the local scale
    pub fn set_local_scale(&mut self, id: TransformId, scale: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.pose.scale = scale;
        self.local_changed(id);
        Ok(())
    }

    /// Replace the whole local pose
    pub fn set_local_pose(&mut self, id: TransformId, pose: Pose) -> Result<(), SceneError> {
        self.node_mut(id)?.pose = pose;
        self.local_changed(id);
        Ok(())
    }

    /// Set the position in world space
    ///
    /// The value is converted into the parent's space, so the local position
    /// changes and the world position reads back as `position`.
    pub fn set_position(&mut self, id: TransformId, position: Vec3) -> Result<(), SceneError> {
        let local = match self.node(id)?.parent {
            Some(parent) => self
                .global_inverse_of(parent)
                .transform_point(&Point3::from(position))
                .coords,
            None => position,
        };
        self.set_local_position(id, local)
    }

    /// Set the rotation in world space
    pub fn set_rotation(&mut self, id: TransformId, rotation: Quat) -> Result<(), SceneError> {
        let local = match self.node(id)?.parent {
            Some(parent) => self.global_rotation_of(parent).inverse() * rotation,
            None => rotation,
        };
        self.set_local_rotation(id, local)
    }

    /// Attach `child` under `parent`, or make it a root with `None`
    ///
    /// The child keeps its local pose, so its world pose follows the new
    /// parent. Fails without touching the hierarchy when `parent` is the
    /// child itself or one of its descendants.
    pub fn set_parent(&mut self, child: TransformId, parent: Option<TransformId>) -> Result<(), SceneError> {
        let old_parent = self.node(child)?.parent;

        if let Some(parent) = parent {
            self.node(parent)?;
            if parent == child || self.is_ancestor(child, parent) {
                log::warn!("Rejected cyclic parent: {:?} under {:?}", child, parent);
                return Err(SceneError::CyclicParent { child, parent });
            }
        }

        if old_parent == parent {
            return Ok(());
        }

        if let Some(old) = old_parent {
            if let Some(old_node) = self.nodes.get_mut(old) {
                old_node.children.retain(|c| *c != child);
            }
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.push(child);
            }
        }
        self.node_mut(child)?.parent = parent;
        self.mark_dirty(child);

        log::trace!("Transform {:?} parent {:?} -> {:?}", child, old_parent, parent);
        Ok(())
    }

    /// Whether `ancestor` appears in the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: TransformId, id: TransformId) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(c).and_then(|n| n.parent);
        }
        false
    }

    /// Rotate `id` so its local -Z axis points at `target`'s world position
    ///
    /// Rejects a target at the same position, or a view direction parallel
    /// to `up`; pass a different `up` in that case.
    pub fn look_at(&mut self, id: TransformId, target: TransformId, up: Vec3) -> Result<(), SceneError> {
        self.node(target)?;
        let target_position = self.global_matrix_of(target).translation_part();
        self.look_at_point(id, target_position, up)
    }

    /// Rotate `id` so its local -Z axis points at a world-space point
    pub fn look_at_point(&mut self, id: TransformId, point: Vec3, up: Vec3) -> Result<(), SceneError> {
        self.node(id)?;
        let eye = self.global_matrix_of(id).translation_part();
        let direction = point - eye;

        if direction.norm_squared() < DEGENERATE_EPSILON || up.norm_squared() < DEGENERATE_EPSILON {
            return Err(SceneError::DegenerateLookAt(id));
        }
        if direction.normalize().cross(&up.normalize()).norm_squared() < DEGENERATE_EPSILON {
            return Err(SceneError::DegenerateLookAt(id));
        }

        // face_towards maps +Z onto its argument; aim +Z away from the target
        self.set_rotation(id, Quat::face_towards(&-direction, &up))
    }

    /// Iterate over all root transforms (no parent)
    pub fn roots(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    fn local_changed(&self, id: TransformId) {
        if let Some(node) = self.nodes.get(id) {
            node.local_matrix.set(None);
        }
        self.mark_dirty(id);
    }

    /// Invalidate the global caches of `id` and its entire subtree
    fn mark_dirty(&self, id: TransformId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                node.invalidate_global();
                stack.extend_from_slice(&node.children);
            }
        }
    }

    fn local_matrix_of(&self, node: &TransformNode) -> Mat4 {
        if let Some(m) = node.local_matrix.get() {
            return m;
        }
        let m = node.pose.to_matrix();
        node.local_matrix.set(Some(m));
        m
    }

    fn global_matrix_of(&self, id: TransformId) -> Mat4 {
        let Some(node) = self.nodes.get(id) else {
            return Mat4::identity();
        };
        if let Some(m) = node.global_matrix.get() {
            return m;
        }
        let local = self.local_matrix_of(node);
        let global = match node.parent {
            Some(parent) => self.global_matrix_of(parent) * local,
            None => local,
        };
        node.global_matrix.set(Some(global));
        global
    }

    fn global_inverse_of(&self, id: TransformId) -> Mat4 {
        let Some(node) = self.nodes.get(id) else {
            return Mat4::identity();
        };
        if let Some(m) = node.global_inverse.get() {
            return m;
        }
        let local_inverse = node.pose.inverse_matrix();
        let inverse = match node.parent {
            Some(parent) => local_inverse * self.global_inverse_of(parent),
            None => local_inverse,
        };
        node.global_inverse.set(Some(inverse));
        inverse
    }

    fn global_rotation_of(&self, id: TransformId) -> Quat {
        let Some(node) = self.nodes.get(id) else {
            return Quat::identity();
        };
        if let Some(q) = node.global_rotation.get() {
            return q;
        }
        let rotation = match node.parent {
            Some(parent) => self.global_rotation_of(parent) * node.pose.rotation,
            None => node.pose.rotation,
        };
        node.global_rotation.set(Some(rotation));
        rotation
    }
}

/// Borrowed read view of one transform
#[derive(Clone, Copy)]
pub struct TransformRef<'a> {
    transforms: &'a Transforms,
    id: TransformId,
    node: &'a TransformNode,
}

impl<'a> TransformRef<'a> {
    /// Handle of this transform
    pub fn id(&self) -> TransformId {
        self.id
    }

    /// GameObject owning this transform
    pub fn game_object(&self) -> GameObjectId {
        self.node.game_object
    }

    /// Parent transform, if any
    pub fn parent(&self) -> Option<TransformId> {
        self.node.parent
    }

    /// Direct children in attach order
    pub fn children(&self) -> &'a [TransformId] {
        &self.node.children
    }

    /// Local pose
    pub fn local_pose(&self) -> Pose {
        self.node.pose
    }

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.node.pose.position
    }

    /// Local rotation
    pub fn local_rotation(&self) -> Quat {
        self.node.pose.rotation
    }

    /// Local rotation as Euler angles (roll, pitch, yaw)
    pub fn local_rotation_euler(&self) -> Vec3 {
        let (roll, pitch, yaw) = self.node.pose.rotation.euler_angles();
        Vec3::new(roll, pitch, yaw)
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.node.pose.scale
    }

    /// T * R * S of the local pose
    pub fn local_matrix(&self) -> Mat4 {
        self.transforms.local_matrix_of(self.node)
    }

    /// parent.global * local, or local for a root
    pub fn global_matrix(&self) -> Mat4 {
        self.transforms.global_matrix_of(self.id)
    }

    /// Inverse of the global matrix, built from inverted TRS factors
    ///
    /// This is the view matrix of a camera sitting on this transform.
    pub fn global_trs_inverse(&self) -> Mat4 {
        self.transforms.global_inverse_of(self.id)
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.global_matrix().translation_part()
    }

    /// World-space rotation (product of rotations up the chain)
    pub fn rotation(&self) -> Quat {
        self.transforms.global_rotation_of(self.id)
    }

    /// World-space -Z axis
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::new(0.0, 0.0, -1.0)
    }

    /// World-space +Y axis
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::new(0.0, 1.0, 0.0)
    }

    /// World-space +X axis
    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::new(1.0, 0.0, 0.0)
    }

    /// Whether the global matrix must be recomputed on next read
    pub fn is_dirty(&self) -> bool {
        self.node.global_matrix.get().is_none()
    }
}
