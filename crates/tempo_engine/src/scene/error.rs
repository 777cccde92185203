//! Scene graph errors

use thiserror::Error;

use super::node::NodeId;
use crate::platform::CollaboratorError;

/// Violation of the single-parent tree invariant.
///
/// A failed structural operation leaves the tree untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// The node to attach already belongs to a parent
    #[error("Node {child} already has parent {parent}; a node can be a child of a single parent")]
    AlreadyParented {
        /// Node that was being attached
        child: NodeId,
        /// Its current parent
        parent: NodeId,
    },

    /// The node to remove is not a child of the given parent
    #[error("Node {child} is not a child of node {parent}")]
    NotAChild {
        /// Node that was being removed
        child: NodeId,
        /// Parent it was removed from
        parent: NodeId,
    },

    /// Attaching would make a node its own ancestor
    #[error("Attaching node {child} under node {parent} would create a cycle")]
    WouldCycle {
        /// Node that was being attached
        child: NodeId,
        /// Intended parent
        parent: NodeId,
    },

    /// The node has already been destroyed
    #[error("Node {0} has been destroyed")]
    Destroyed(NodeId),

    /// The handle does not refer to a live node
    #[error("Node handle does not refer to a live node")]
    UnknownNode,
}

/// Error returned by tree operations and by node/component hooks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Tree invariant violation
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Failure surfaced by a host collaborator
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Failure raised by node code
    #[error("Node error: {0}")]
    Node(String),
}
