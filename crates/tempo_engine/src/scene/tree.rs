//! Node storage and structural operations
//!
//! Nodes live in a slot map owned by the [`SceneTree`]. Ownership flows from a
//! parent's child list; the parent link stored on each node is only a
//! back-reference used for traversal, world transforms and invariant checks.
//!
//! A node's behaviour is moved out of its slot while one of its hooks runs so
//! the hook can receive the whole tree mutably. Structural changes made by a
//! hook (spawning, destroying, removing) are therefore visible immediately to
//! the traversal that invoked it.

use slotmap::{new_key_type, SlotMap};

use super::component::{Component, ComponentId};
use super::depth::sort_by_depth;
use super::error::{SceneError, StructureError};
use super::node::{Node, NodeContext, NodeId};
use crate::foundation::math::Transform;

new_key_type! {
    /// Handle of a node inside a [`SceneTree`]
    pub struct NodeKey;
}

pub(crate) struct NodeSlot {
    pub(crate) id: NodeId,
    pub(crate) behavior: Option<Box<dyn Node>>,
    pub(crate) depth: Option<i32>,
    pub(crate) transform: Transform,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) components: Vec<(ComponentId, Box<dyn Component>)>,
    pub(crate) initialized: bool,
    pub(crate) destroyed: bool,
    pub(crate) destroy_notified: bool,
}

/// Arena holding every node of one or more scene trees
#[derive(Default)]
pub struct SceneTree {
    pub(crate) nodes: SlotMap<NodeKey, NodeSlot>,
    next_component: u64,
}

impl SceneTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node. Its `init` hook runs when it joins a parent.
    pub fn create(&mut self, node: impl Node + 'static) -> NodeKey {
        self.create_boxed(Box::new(node))
    }

    /// Create a detached node from a boxed behaviour
    pub fn create_boxed(&mut self, node: Box<dyn Node>) -> NodeKey {
        let depth = node.depth();
        self.nodes.insert(NodeSlot {
            id: NodeId::next(),
            behavior: Some(node),
            depth,
            transform: Transform::identity(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            initialized: false,
            destroyed: false,
            destroy_notified: false,
        })
    }

    /// Create `node` and attach it under `parent`.
    ///
    /// The new node is released again if attaching fails.
    pub fn spawn(&mut self, parent: NodeKey, node: impl Node + 'static) -> Result<NodeKey, SceneError> {
        let child = self.create(node);
        if let Err(error) = self.add_child(parent, child) {
            if self.parent(child).is_none() {
                self.destroy(child);
            }
            return Err(error);
        }
        Ok(child)
    }

    /// Attach a detached node as the last child of `parent`.
    ///
    /// Runs the child's pre-init (its own `init`, then its subtree, parents
    /// before children). Attaching a depth-bearing node re-sorts the siblings.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        self.check_attachable(parent, child).map_err(|error| {
            log::debug!("Rejected add_child: {}", error);
            error
        })?;

        if let Some(slot) = self.nodes.get_mut(parent) {
            slot.children.push(child);
        }
        if let Some(slot) = self.nodes.get_mut(child) {
            slot.parent = Some(parent);
        }

        self.pre_init(child)?;

        if self.depth(child).is_some() {
            self.sort_children(parent);
        }
        Ok(())
    }

    fn check_attachable(&self, parent: NodeKey, child: NodeKey) -> Result<(), StructureError> {
        let parent_slot = self.nodes.get(parent).ok_or(StructureError::UnknownNode)?;
        let child_slot = self.nodes.get(child).ok_or(StructureError::UnknownNode)?;

        if let Some(current) = child_slot.parent {
            let current_id = self.nodes.get(current).map_or(parent_slot.id, |slot| slot.id);
            return Err(StructureError::AlreadyParented {
                child: child_slot.id,
                parent: current_id,
            });
        }
        if parent_slot.destroyed {
            return Err(StructureError::Destroyed(parent_slot.id));
        }
        if child_slot.destroyed {
            return Err(StructureError::Destroyed(child_slot.id));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(StructureError::WouldCycle {
                child: child_slot.id,
                parent: parent_slot.id,
            });
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, mut node: NodeKey) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Run `init` for `key` and then for its subtree, skipping nodes already
    /// initialized
    pub(crate) fn pre_init(&mut self, key: NodeKey) -> Result<(), SceneError> {
        let needs_init = match self.nodes.get_mut(key) {
            Some(slot) if !slot.initialized => {
                slot.initialized = true;
                true
            }
            Some(_) => false,
            None => return Ok(()),
        };
        if needs_init {
            self.with_behavior(key, |node, ctx| node.init(ctx))?;
        }

        let mut index = 0;
        while let Some(child) = self.child_at(key, index) {
            self.pre_init(child)?;
            index += 1;
        }
        Ok(())
    }

    /// Detach and destroy a child of `parent`
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), StructureError> {
        let parent_id = self.nodes.get(parent).map(|slot| slot.id);
        let child_slot = self.nodes.get(child).ok_or(StructureError::UnknownNode)?;

        if child_slot.parent != Some(parent) {
            let error = StructureError::NotAChild {
                child: child_slot.id,
                parent: parent_id.ok_or(StructureError::UnknownNode)?,
            };
            log::debug!("Rejected remove_child: {}", error);
            return Err(error);
        }

        self.destroy(child);
        self.release_child(parent, child);
        Ok(())
    }

    /// Detach and destroy every child of `parent`
    pub fn remove_children(&mut self, parent: NodeKey) {
        while let Some(child) = self.child_at(parent, 0) {
            if self.remove_child(parent, child).is_err() {
                break;
            }
        }
    }

    /// Destroy `key`: flag it, destroy its whole subtree and dispose its
    /// components. Destroying an already destroyed node does nothing.
    ///
    /// A destroyed node that still has a parent stays in the parent's child
    /// list until the next traversal of that parent detaches it.
    pub fn destroy(&mut self, key: NodeKey) {
        let Some(slot) = self.nodes.get_mut(key) else {
            return;
        };
        if slot.destroyed {
            return;
        }

        slot.destroyed = true;
        if let Some(behavior) = slot.behavior.as_mut() {
            behavior.on_destroy();
            slot.destroy_notified = true;
        }
        let children = std::mem::take(&mut slot.children);
        let components = std::mem::take(&mut slot.components);
        let detached = slot.parent.is_none();
        log::trace!("Destroying node {}", slot.id);

        for child in children {
            self.destroy(child);
            self.nodes.remove(child);
        }
        for (_, mut component) in components {
            component.dispose();
        }

        if detached {
            self.nodes.remove(key);
        }
    }

    /// Attach a component to `key`
    pub fn add_component(
        &mut self,
        key: NodeKey,
        component: impl Component + 'static,
    ) -> Result<ComponentId, StructureError> {
        let slot = self.nodes.get_mut(key).ok_or(StructureError::UnknownNode)?;
        if slot.destroyed {
            return Err(StructureError::Destroyed(slot.id));
        }

        self.next_component += 1;
        let id = ComponentId(self.next_component);
        slot.components.push((id, Box::new(component)));
        Ok(id)
    }

    /// Detach and dispose a component. Returns `false` if it was not attached.
    pub fn remove_component(&mut self, key: NodeKey, id: ComponentId) -> bool {
        let Some(slot) = self.nodes.get_mut(key) else {
            return false;
        };
        let Some(position) = slot.components.iter().position(|(cid, _)| *cid == id) else {
            return false;
        };
        let (_, mut component) = slot.components.remove(position);
        component.dispose();
        true
    }

    /// Number of components attached to `key`
    pub fn component_count(&self, key: NodeKey) -> usize {
        self.nodes.get(key).map_or(0, |slot| slot.components.len())
    }

    /// Whether `key` refers to a node still held by the tree
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes held by the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identity of `key`
    pub fn id(&self, key: NodeKey) -> Option<NodeId> {
        self.nodes.get(key).map(|slot| slot.id)
    }

    /// Parent of `key`
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|slot| slot.parent)
    }

    /// Children of `key` in render order
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `key` was destroyed. Released handles count as destroyed.
    pub fn is_destroyed(&self, key: NodeKey) -> bool {
        self.nodes.get(key).map_or(true, |slot| slot.destroyed)
    }

    /// Sibling render priority of `key`
    pub fn depth(&self, key: NodeKey) -> Option<i32> {
        let slot = self.nodes.get(key)?;
        slot.behavior.as_ref().map_or(slot.depth, |behavior| behavior.depth())
    }

    /// Local transform of `key`
    pub fn transform(&self, key: NodeKey) -> Option<&Transform> {
        self.nodes.get(key).map(|slot| &slot.transform)
    }

    /// Local transform of `key`, mutably
    pub fn transform_mut(&mut self, key: NodeKey) -> Option<&mut Transform> {
        self.nodes.get_mut(key).map(|slot| &mut slot.transform)
    }

    /// Local transform of `key` composed with its ancestors.
    ///
    /// Recomputed on every call, so ancestor edits are visible immediately.
    pub fn world_transform(&self, key: NodeKey) -> Option<Transform> {
        let slot = self.nodes.get(key)?;
        match slot.parent.and_then(|parent| self.world_transform(parent)) {
            Some(parent_world) => Some(parent_world.combine(&slot.transform)),
            None => Some(slot.transform.clone()),
        }
    }

    pub(crate) fn child_at(&self, parent: NodeKey, index: usize) -> Option<NodeKey> {
        self.nodes
            .get(parent)
            .and_then(|slot| slot.children.get(index).copied())
    }

    pub(crate) fn child_position(&self, parent: NodeKey, child: NodeKey) -> Option<usize> {
        self.nodes
            .get(parent)
            .and_then(|slot| slot.children.iter().position(|key| *key == child))
    }

    /// Unlink `child` from `parent` and free its slot
    pub(crate) fn release_child(&mut self, parent: NodeKey, child: NodeKey) {
        if let Some(position) = self.child_position(parent, child) {
            if let Some(slot) = self.nodes.get_mut(parent) {
                slot.children.remove(position);
            }
        }
        if let Some(slot) = self.nodes.get_mut(child) {
            slot.parent = None;
        }
        self.nodes.remove(child);
    }

    fn sort_children(&mut self, parent: NodeKey) {
        let Some(slot) = self.nodes.get(parent) else {
            return;
        };
        let mut children = slot.children.clone();
        sort_by_depth(&mut children, |key| self.depth(*key));
        if let Some(slot) = self.nodes.get_mut(parent) {
            slot.children = children;
        }
    }

    /// Run `hook` with the behaviour of `key` moved out of its slot.
    ///
    /// Nodes without a behaviour in place (their hook is already running
    /// further up the stack) are skipped.
    pub(crate) fn with_behavior<F>(&mut self, key: NodeKey, hook: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut dyn Node, &mut NodeContext<'_>) -> Result<(), SceneError>,
    {
        let Some(mut behavior) = self.nodes.get_mut(key).and_then(|slot| slot.behavior.take()) else {
            return Ok(());
        };

        let result = {
            let mut ctx = NodeContext::new(self, key);
            hook(behavior.as_mut(), &mut ctx)
        };

        self.restore_behavior(key, behavior);
        result
    }

    fn restore_behavior(&mut self, key: NodeKey, mut behavior: Box<dyn Node>) {
        match self.nodes.get_mut(key) {
            Some(slot) => {
                slot.depth = behavior.depth();
                if slot.destroyed && !slot.destroy_notified {
                    behavior.on_destroy();
                    slot.destroy_notified = true;
                }
                slot.behavior = Some(behavior);
            }
            // Released while its hook ran
            None => behavior.on_destroy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::scene::Group;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        journal: Journal,
        depth: Option<i32>,
    }

    impl Probe {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Rc::clone(journal),
                depth: None,
            }
        }

        fn at_depth(mut self, depth: i32) -> Self {
            self.depth = Some(depth);
            self
        }
    }

    impl Node for Probe {
        fn init(&mut self, _ctx: &mut NodeContext<'_>) -> Result<(), SceneError> {
            self.journal.borrow_mut().push(format!("init {}", self.name));
            Ok(())
        }

        fn on_destroy(&mut self) {
            self.journal.borrow_mut().push(format!("destroy {}", self.name));
        }

        fn depth(&self) -> Option<i32> {
            self.depth
        }
    }

    struct Disposable {
        name: &'static str,
        journal: Journal,
    }

    impl Component for Disposable {
        fn dispose(&mut self) {
            self.journal.borrow_mut().push(format!("dispose {}", self.name));
        }
    }

    fn count(journal: &Journal, entry: &str) -> usize {
        journal.borrow().iter().filter(|line| line.as_str() == entry).count()
    }

    #[test]
    fn test_second_parent_is_rejected_and_tree_unchanged() {
        let mut tree = SceneTree::new();
        let first = tree.create(Group);
        let second = tree.create(Group);
        let child = tree.create(Group);

        tree.add_child(first, child).unwrap();
        let result = tree.add_child(second, child);

        assert!(matches!(
            result,
            Err(SceneError::Structure(StructureError::AlreadyParented { .. }))
        ));
        assert_eq!(tree.children(first), &[child]);
        assert!(tree.children(second).is_empty());
        assert_eq!(tree.parent(child), Some(first));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let child = tree.create(Group);
        tree.add_child(root, child).unwrap();

        let result = tree.add_child(child, root);
        assert!(matches!(
            result,
            Err(SceneError::Structure(StructureError::WouldCycle { .. }))
        ));
        assert!(matches!(
            tree.add_child(root, root),
            Err(SceneError::Structure(StructureError::WouldCycle { .. }))
        ));
    }

    #[test]
    fn test_add_child_runs_init_parent_before_children() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let branch = tree.create(Probe::new("branch", &journal));
        let leaf = tree.create(Probe::new("leaf", &journal));

        // Built while detached from the root
        tree.add_child(branch, leaf).unwrap();
        tree.add_child(root, branch).unwrap();

        assert_eq!(*journal.borrow(), vec!["init leaf", "init branch"]);
        // Each node initializes once even though the leaf joined first
        assert_eq!(count(&journal, "init leaf"), 1);
    }

    #[test]
    fn test_pre_init_order_for_prebuilt_subtree() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let root = tree.create(Probe::new("root", &journal));
        let child = tree.create(Probe::new("child", &journal));
        tree.nodes[root].children.push(child);
        tree.nodes[child].parent = Some(root);

        tree.pre_init(root).unwrap();

        assert_eq!(*journal.borrow(), vec!["init root", "init child"]);
    }

    #[test]
    fn test_remove_child_requires_actual_child() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let other = tree.create(Group);
        let child = tree.create(Group);
        tree.add_child(root, child).unwrap();

        assert!(matches!(
            tree.remove_child(other, child),
            Err(StructureError::NotAChild { .. })
        ));
        assert!(tree.contains(child));

        tree.remove_child(root, child).unwrap();
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(child));
        assert!(tree.is_destroyed(child));
    }

    #[test]
    fn test_destroy_cascades_and_disposes_once() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let root = tree.create(Probe::new("root", &journal));
        let child = tree.create(Probe::new("child", &journal));
        let grandchild = tree.create(Probe::new("grandchild", &journal));
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();
        tree.add_component(child, Disposable { name: "light", journal: Rc::clone(&journal) })
            .unwrap();
        tree.add_component(grandchild, Disposable { name: "sound", journal: Rc::clone(&journal) })
            .unwrap();

        tree.destroy(child);
        tree.destroy(child);

        assert!(tree.is_destroyed(child));
        assert!(tree.is_destroyed(grandchild));
        assert!(!tree.contains(grandchild));
        // Still listed until the parent's next pass detaches it
        assert_eq!(tree.children(root), &[child]);
        for entry in ["destroy child", "destroy grandchild", "dispose light", "dispose sound"] {
            assert_eq!(count(&journal, entry), 1, "{entry}");
        }
        assert_eq!(count(&journal, "destroy root"), 0);
    }

    #[test]
    fn test_destroyed_parent_accepts_no_children() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let parent = tree.create(Group);
        tree.add_child(root, parent).unwrap();
        tree.destroy(parent);

        let orphan = tree.create(Group);
        assert!(matches!(
            tree.add_child(parent, orphan),
            Err(SceneError::Structure(StructureError::Destroyed(_)))
        ));
        assert!(matches!(
            tree.spawn(parent, Group),
            Err(SceneError::Structure(StructureError::Destroyed(_)))
        ));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_remove_component_disposes() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let node = tree.create(Group);
        let id = tree
            .add_component(node, Disposable { name: "fog", journal: Rc::clone(&journal) })
            .unwrap();

        assert!(tree.remove_component(node, id));
        assert!(!tree.remove_component(node, id));
        assert_eq!(tree.component_count(node), 0);
        assert_eq!(count(&journal, "dispose fog"), 1);
    }

    #[test]
    fn test_depth_sort_on_insertion() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let three = tree.spawn(root, Probe::new("three", &journal).at_depth(3)).unwrap();
        let one = tree.spawn(root, Probe::new("one", &journal).at_depth(1)).unwrap();
        let two = tree.spawn(root, Probe::new("two", &journal).at_depth(2)).unwrap();
        assert_eq!(tree.children(root), &[three, two, one]);

        let second_three = tree.spawn(root, Probe::new("three again", &journal).at_depth(3)).unwrap();
        assert_eq!(tree.children(root), &[three, second_three, two, one]);
    }

    #[test]
    fn test_groups_do_not_move_when_sorting() {
        let journal = Journal::default();
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let group = tree.spawn(root, Group).unwrap();
        let low = tree.spawn(root, Probe::new("low", &journal).at_depth(1)).unwrap();
        let high = tree.spawn(root, Probe::new("high", &journal).at_depth(9)).unwrap();

        assert_eq!(tree.children(root), &[group, high, low]);
    }

    #[test]
    fn test_world_transform_follows_ancestors() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        let arm = tree.spawn(root, Group).unwrap();
        let hand = tree.spawn(arm, Group).unwrap();

        tree.transform_mut(root).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
        tree.transform_mut(arm).unwrap().rotation = Quat::from_axis_angle(&Vec3::z_axis(), PI / 2.0);
        tree.transform_mut(hand).unwrap().position = Vec3::new(1.0, 0.0, 0.0);

        let world = tree.world_transform(hand).unwrap();
        assert_relative_eq!(world.position, Vec3::new(10.0, 1.0, 0.0), epsilon = 1e-5);

        let expected = tree
            .world_transform(arm)
            .unwrap()
            .combine(tree.transform(hand).unwrap());
        assert_relative_eq!(world.position, expected.position, epsilon = 1e-6);

        // No invalidation call needed
        tree.transform_mut(root).unwrap().position = Vec3::new(-5.0, 0.0, 0.0);
        let moved = tree.world_transform(hand).unwrap();
        assert_relative_eq!(moved.position, Vec3::new(-5.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_root_world_transform_is_local() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        tree.transform_mut(root).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(tree.world_transform(root).as_ref(), tree.transform(root));
    }

    #[test]
    fn test_node_ids_are_unique_and_increasing() {
        let mut tree = SceneTree::new();
        let a = tree.create(Group);
        let b = tree.create(Group);
        assert!(tree.id(a).unwrap() < tree.id(b).unwrap());
    }

    #[test]
    fn test_remove_children_releases_all() {
        let mut tree = SceneTree::new();
        let root = tree.create(Group);
        for _ in 0..4 {
            tree.spawn(root, Group).unwrap();
        }
        tree.remove_children(root);
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }
}
