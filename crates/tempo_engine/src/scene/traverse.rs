//! Update and render passes over a subtree
//!
//! Both passes visit a node before its children and detach children whose
//! destroyed flag is set, so a node destroyed during a pass is never visited
//! as a live child afterwards.

use super::error::SceneError;
use super::tree::{NodeKey, SceneTree};
use crate::platform::RenderState;
use crate::render::Frame;

/// Update `key`: its own hook, then its components in attachment order, then
/// every child subtree
pub fn update_node(tree: &mut SceneTree, key: NodeKey, delta: f32) -> Result<(), SceneError> {
    tree.with_behavior(key, |node, ctx| node.update(ctx, delta))?;

    if let Some(slot) = tree.nodes.get_mut(key) {
        for (_, component) in slot.components.iter_mut() {
            component.update(delta)?;
        }
    }

    let mut index = 0;
    while let Some(child) = tree.child_at(key, index) {
        if tree.is_destroyed(child) {
            tree.release_child(key, child);
            continue;
        }
        update_node(tree, child, delta)?;
        index = settle_child(tree, key, child, index);
    }
    Ok(())
}

/// Render `key`: its own hook, then its children.
///
/// With components attached the children are rendered once per component in
/// additive forward state, each pass bracketed by the component's
/// `enter`/`restore`. The standard state is applied again afterwards, also
/// when a pass fails.
pub fn render_node(
    tree: &mut SceneTree,
    key: NodeKey,
    delta: f32,
    frame: &mut Frame<'_>,
) -> Result<(), SceneError> {
    tree.with_behavior(key, |node, ctx| node.render(ctx, delta, frame))?;

    if tree.component_count(key) == 0 {
        return render_children(tree, key, delta, frame);
    }

    frame.device.apply_state(RenderState::FORWARD_ADDITIVE);
    let result = render_component_passes(tree, key, delta, frame);
    frame.device.apply_state(RenderState::STANDARD);
    result
}

fn render_component_passes(
    tree: &mut SceneTree,
    key: NodeKey,
    delta: f32,
    frame: &mut Frame<'_>,
) -> Result<(), SceneError> {
    let mut index = 0;
    loop {
        // Components may be removed by the children rendered in a pass
        let Some(slot) = tree.nodes.get_mut(key) else {
            return Ok(());
        };
        let Some((id, component)) = slot.components.get_mut(index) else {
            return Ok(());
        };
        let id = *id;
        component.enter(&mut *frame.device)?;

        let pass = render_children(tree, key, delta, frame);

        let restored = match tree.nodes.get_mut(key) {
            Some(slot) => match slot.components.iter_mut().find(|(cid, _)| *cid == id) {
                Some((_, component)) => component.restore(&mut *frame.device),
                None => Ok(()),
            },
            None => Ok(()),
        };
        pass?;
        restored?;

        index = tree
            .nodes
            .get(key)
            .and_then(|slot| slot.components.iter().position(|(cid, _)| *cid == id))
            .map_or(index, |position| position + 1);
    }
}

fn render_children(
    tree: &mut SceneTree,
    key: NodeKey,
    delta: f32,
    frame: &mut Frame<'_>,
) -> Result<(), SceneError> {
    let mut index = 0;
    while let Some(child) = tree.child_at(key, index) {
        if tree.is_destroyed(child) {
            tree.release_child(key, child);
            continue;
        }
        render_node(tree, child, delta, frame)?;
        index = settle_child(tree, key, child, index);
    }
    Ok(())
}

/// Index of the sibling to visit after `child`.
///
/// Detaches `child` if it was destroyed while being visited. Earlier siblings
/// removed during the visit are accounted for by looking the child up again.
fn settle_child(tree: &mut SceneTree, parent: NodeKey, child: NodeKey, index: usize) -> usize {
    match tree.child_position(parent, child) {
        Some(position) if tree.is_destroyed(child) => {
            tree.release_child(parent, child);
            position
        }
        Some(position) => position + 1,
        None => index,
    }
}
