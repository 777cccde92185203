//! Node identity, behaviour hooks and the context handed to them

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::component::{Component, ComponentId};
use super::error::SceneError;
use super::tree::{NodeKey, SceneTree};
use crate::foundation::math::Transform;
use crate::render::Frame;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle hooks of a scene node.
///
/// Every hook is optional. Hooks receive a [`NodeContext`] that can reshape
/// the tree, including destroying the node itself; the traversal that called
/// the hook detaches destroyed children before moving on.
pub trait Node {
    /// Runs once, when the node first joins a tree
    fn init(&mut self, _ctx: &mut NodeContext<'_>) -> Result<(), SceneError> {
        Ok(())
    }

    /// Runs once per update step, before components and children
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _delta: f32) -> Result<(), SceneError> {
        Ok(())
    }

    /// Runs once per frame, before the children render
    fn render(
        &mut self,
        _ctx: &mut NodeContext<'_>,
        _delta: f32,
        _frame: &mut Frame<'_>,
    ) -> Result<(), SceneError> {
        Ok(())
    }

    /// Runs once, when the node is destroyed
    fn on_destroy(&mut self) {}

    /// Sibling render priority; higher renders first.
    ///
    /// Nodes returning `None` keep their position among siblings.
    fn depth(&self) -> Option<i32> {
        None
    }
}

/// Node with no behaviour of its own, used for grouping
#[derive(Debug, Clone, Copy, Default)]
pub struct Group;

impl Node for Group {}

/// Tree access for a node while one of its hooks runs
pub struct NodeContext<'t> {
    tree: &'t mut SceneTree,
    key: NodeKey,
}

impl<'t> NodeContext<'t> {
    pub(crate) fn new(tree: &'t mut SceneTree, key: NodeKey) -> Self {
        Self { tree, key }
    }

    /// Handle of the node whose hook is running
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Identity of the node, if it is still in the tree
    pub fn id(&self) -> Option<NodeId> {
        self.tree.id(self.key)
    }

    /// The whole tree
    pub fn tree(&self) -> &SceneTree {
        &*self.tree
    }

    /// The whole tree, mutably
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut *self.tree
    }

    /// Parent of the node
    pub fn parent(&self) -> Option<NodeKey> {
        self.tree.parent(self.key)
    }

    /// Local transform
    pub fn transform(&self) -> Option<&Transform> {
        self.tree.transform(self.key)
    }

    /// Local transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.tree.transform_mut(self.key)
    }

    /// Transform composed with every ancestor
    pub fn world_transform(&self) -> Option<Transform> {
        self.tree.world_transform(self.key)
    }

    /// Create `node` and attach it as a child of this node
    pub fn spawn(&mut self, node: impl Node + 'static) -> Result<NodeKey, SceneError> {
        self.tree.spawn(self.key, node)
    }

    /// Attach an existing detached node as a child of this node
    pub fn add_child(&mut self, child: NodeKey) -> Result<(), SceneError> {
        self.tree.add_child(self.key, child)
    }

    /// Attach a component to this node
    pub fn add_component(
        &mut self,
        component: impl Component + 'static,
    ) -> Result<ComponentId, SceneError> {
        Ok(self.tree.add_component(self.key, component)?)
    }

    /// Destroy this node and its subtree
    pub fn destroy(&mut self) {
        self.tree.destroy(self.key);
    }

    /// Whether this node has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.tree.is_destroyed(self.key)
    }
}
