//! Scene root ownership

use super::error::SceneError;
use super::node::{Group, Node};
use super::traverse::{render_node, update_node};
use super::tree::{NodeKey, SceneTree};
use crate::render::Frame;

/// A tree of nodes hanging off a single root
pub struct Scene {
    tree: SceneTree,
    root: NodeKey,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene with an empty [`Group`] root
    pub fn new() -> Self {
        Self::with_root(Group)
    }

    /// Create a scene whose root has the given behaviour
    pub fn with_root(root: impl Node + 'static) -> Self {
        let mut tree = SceneTree::new();
        let root = tree.create(root);
        Self { tree, root }
    }

    /// Handle of the root node
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Node storage
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Node storage, mutably
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// Run `init` on the root and on any node not yet initialized.
    ///
    /// Nodes attached with [`Scene::spawn`] are initialized as they join, so
    /// this mainly matters for the behaviour passed to [`Scene::with_root`].
    /// Calling it again is a no-op for nodes that already ran `init`.
    pub fn init(&mut self) -> Result<(), SceneError> {
        self.tree.pre_init(self.root)
    }

    /// Create `node` as the last child of the root
    pub fn spawn(&mut self, node: impl Node + 'static) -> Result<NodeKey, SceneError> {
        self.tree.spawn(self.root, node)
    }

    /// Create `node` as the last child of `parent`
    pub fn spawn_under(
        &mut self,
        parent: NodeKey,
        node: impl Node + 'static,
    ) -> Result<NodeKey, SceneError> {
        self.tree.spawn(parent, node)
    }

    /// Run one update step over the whole scene
    pub fn update(&mut self, delta: f32) -> Result<(), SceneError> {
        update_node(&mut self.tree, self.root, delta)
    }

    /// Render the whole scene once
    pub fn render(&mut self, delta: f32, frame: &mut Frame<'_>) -> Result<(), SceneError> {
        render_node(&mut self.tree, self.root, delta, frame)
    }

    /// Destroy every node except the root
    pub fn clear(&mut self) {
        self.tree.remove_children(self.root);
    }

    /// Destroy the root and with it the whole scene
    pub fn dispose(&mut self) {
        self.tree.destroy(self.root);
    }

    /// Whether the root has been destroyed
    pub fn is_disposed(&self) -> bool {
        self.tree.is_destroyed(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{CountingBatcher, NullDevice};
    use crate::scene::NodeContext;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Spawns a child every update
    struct Spawner;

    impl Node for Spawner {
        fn update(&mut self, ctx: &mut NodeContext<'_>, _delta: f32) -> Result<(), SceneError> {
            ctx.spawn(Group)?;
            Ok(())
        }
    }

    /// Root that counts its `init` calls and adds a child there
    struct Founder {
        inits: Rc<Cell<u32>>,
    }

    impl Node for Founder {
        fn init(&mut self, ctx: &mut NodeContext<'_>) -> Result<(), SceneError> {
            self.inits.set(self.inits.get() + 1);
            ctx.spawn(Group)?;
            Ok(())
        }
    }

    #[test]
    fn test_custom_root_initializes_once() {
        let inits = Rc::new(Cell::new(0));
        let mut scene = Scene::with_root(Founder {
            inits: Rc::clone(&inits),
        });
        let early = scene.spawn(Group).unwrap();
        assert_eq!(inits.get(), 0);

        scene.init().unwrap();
        scene.init().unwrap();

        assert_eq!(inits.get(), 1);
        let children = scene.tree().children(scene.root());
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], early);
    }

    #[test]
    fn test_nodes_spawned_mid_update_join_immediately() {
        let mut scene = Scene::new();
        let spawner = scene.spawn(Spawner).unwrap();

        scene.update(1.0 / 60.0).unwrap();
        scene.update(1.0 / 60.0).unwrap();

        assert_eq!(scene.tree().children(spawner).len(), 2);
    }

    #[test]
    fn test_clear_keeps_root() {
        let mut scene = Scene::new();
        scene.spawn(Group).unwrap();
        scene.spawn(Group).unwrap();

        scene.clear();

        assert!(scene.tree().children(scene.root()).is_empty());
        assert_eq!(scene.tree().len(), 1);
        assert!(!scene.is_disposed());
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut scene = Scene::new();
        let child = scene.spawn(Group).unwrap();
        scene.spawn_under(child, Group).unwrap();

        scene.dispose();

        assert!(scene.is_disposed());
        assert!(scene.tree().is_empty());

        let mut batcher = CountingBatcher::default();
        let mut device = NullDevice::default();
        let mut frame = Frame::new(&mut batcher, &mut device);
        scene.render(0.0, &mut frame).unwrap();
        scene.update(0.0).unwrap();
    }
}
