//! Scene graph storage and transform propagation
//!
//! Nodes live in a slot arena addressed by [`NodeId`]. Every world-space query
//! (`world_matrix`, `decompose_world`, ...) is composed freshly from the
//! ancestor chain, so readers never observe a matrix left over from a previous
//! frame. [`SceneGraph::update_world`] additionally writes the per-node cache
//! that renderers read.
//!
//! # Reparenting
//!
//! - [`SceneGraph::add_child`] keeps the child's *local* transform, so the
//!   child moves with its new parent.
//! - [`SceneGraph::attach`] keeps the child's *world* transform by solving for
//!   the new local transform.
//!
//! The `set_world_*` helpers apply the same solve without touching the
//! hierarchy at all.

use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, SceneError};
use crate::id::NodeId;
use crate::node::{Node, NodeKind};

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed node hierarchy with a single `Scene` root.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the scene root.
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            live: 0,
        };
        graph.root = graph.spawn(Node::new("scene", NodeKind::Scene));
        graph
    }

    /// The top-level scene node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    #[inline]
    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.slot(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Insert an unparented node.
    pub fn spawn(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        node.world = node.local_matrix();
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        }
    }

    /// Insert a node directly under `parent`, keeping its local transform.
    pub fn spawn_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.get(parent)?;
        let id = self.spawn(node);
        self.link(parent, id);
        Ok(id)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    /// First live node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, node)| node.name == name).map(|(id, _)| id)
    }

    /// Iterate over all live nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|node| (NodeId::new(index as u32, slot.generation), node))
        })
    }

    /// True when `ancestor` appears on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.slot(node).and_then(|n| n.parent);
        }
        false
    }

    fn check_reparent(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        if child == self.root {
            return Err(SceneError::RootRemoval);
        }
        if parent == child {
            return Err(SceneError::SelfParent(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected { child, parent });
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let old_parent = self.slot(child).and_then(|n| n.parent);
        if let Some(old) = old_parent {
            if let Ok(node) = self.get_mut(old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Ok(node) = self.get_mut(child) {
            node.parent = None;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        if let Ok(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        if let Ok(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Reparent `child` under `parent`, keeping its local transform.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_reparent(parent, child)?;
        self.link(parent, child);
        Ok(())
    }

    /// Reparent `child` under `parent`, keeping its world transform.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_reparent(parent, child)?;

        let child_world = self.world_matrix(child)?;
        let parent_world = self.world_matrix(parent)?;
        let (scale, rotation, position) =
            (parent_world.inverse() * child_world).to_scale_rotation_translation();

        self.link(parent, child);
        let node = self.get_mut(child)?;
        node.position = position;
        node.rotation = rotation.normalize();
        node.scale = scale;
        Ok(())
    }

    /// Make `child` a root-less node, keeping its world transform.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        if child == self.root {
            return Err(SceneError::RootRemoval);
        }
        let world = self.world_matrix(child)?;
        self.unlink(child);
        let (scale, rotation, position) = world.to_scale_rotation_translation();
        let node = self.get_mut(child)?;
        node.position = position;
        node.rotation = rotation.normalize();
        node.scale = scale;
        Ok(())
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        self.get(id)?;
        self.unlink(id);

        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index() as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index());
                self.live -= 1;
                removed += 1;
            }
        }
        log::trace!("Removed {} node(s) rooted at {:?}", removed, id);
        Ok(())
    }

    /// World matrix composed from the ancestor chain.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4> {
        let node = self.get(id)?;
        let mut world = node.local_matrix();
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.get(parent_id)?;
            world = parent.local_matrix() * world;
            current = parent.parent;
        }
        Ok(world)
    }

    fn parent_world_matrix(&self, id: NodeId) -> Result<Mat4> {
        match self.get(id)?.parent {
            Some(parent) => self.world_matrix(parent),
            None => Ok(Mat4::IDENTITY),
        }
    }

    /// Refresh the cached world matrix of `id` and all its descendants.
    pub fn update_world(&mut self, id: NodeId) -> Result<()> {
        let parent_world = self.parent_world_matrix(id)?;
        let mut stack = vec![(id, parent_world)];

        while let Some((current, parent_world)) = stack.pop() {
            let node = self.get_mut(current)?;
            node.world = parent_world * node.local_matrix();
            let world = node.world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
        Ok(())
    }

    /// Refresh cached world matrices for every tree in the arena.
    pub fn update_all(&mut self) -> Result<()> {
        let tops: Vec<NodeId> = self
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect();
        for id in tops {
            self.update_world(id)?;
        }
        Ok(())
    }

    /// World (position, orientation, scale) of a node.
    pub fn decompose_world(&self, id: NodeId) -> Result<(Vec3, Quat, Vec3)> {
        let (scale, rotation, position) = self.world_matrix(id)?.to_scale_rotation_translation();
        Ok((position, rotation.normalize(), scale))
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.w_axis.truncate())
    }

    pub fn world_rotation(&self, id: NodeId) -> Result<Quat> {
        Ok(self.decompose_world(id)?.1)
    }

    /// Move a node so its world position becomes `position`.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        let local = self.parent_world_matrix(id)?.inverse().transform_point3(position);
        self.get_mut(id)?.position = local;
        Ok(())
    }

    /// Orient a node so its world orientation becomes `rotation`.
    ///
    /// Exact when no ancestor carries non-uniform scale.
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<()> {
        let (_, parent_rotation, _) = self.parent_world_matrix(id)?.to_scale_rotation_translation();
        let local = parent_rotation.normalize().inverse() * rotation;
        self.get_mut(id)?.rotation = local.normalize();
        Ok(())
    }

    /// Premultiply a node's world orientation by `rotation`, keeping its world
    /// position.
    pub fn apply_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<()> {
        let current = self.world_rotation(id)?;
        self.set_world_rotation(id, rotation * current)
    }
}
