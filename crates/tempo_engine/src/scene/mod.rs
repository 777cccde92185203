//! Scene graph
//!
//! Hierarchical nodes with single-parent ownership, per-node components and
//! depth-ordered siblings.
//!
//! - [`SceneTree`] stores nodes and performs structural operations
//! - [`Node`] and [`Component`] are the behaviour hooks users implement
//! - [`Scene`] pairs a tree with its root and drives update/render passes
//!
//! Hooks may change the tree while a pass is running. Destroyed children are
//! detached by their parent's next pass, within the same update or render.

mod component;
mod depth;
mod error;
mod node;
mod root;
mod traverse;
mod tree;

pub use component::{Component, ComponentId};
pub use depth::sort_by_depth;
pub use error::{SceneError, StructureError};
pub use node::{Group, Node, NodeContext, NodeId};
pub use root::Scene;
pub use traverse::{render_node, update_node};
pub use tree::{NodeKey, SceneTree};
