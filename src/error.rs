use crate::NodeId;

/// Errors returned by [`TmTree`](crate::TmTree) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The id was not created by this tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),

    /// The empty tree can not be the child of another node.
    #[error("node {0:?} is the empty tree and can not be adopted")]
    EmptyChild(NodeId),

    /// A node can only be adopted by a single parent.
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),

    /// The same child was given more than once.
    #[error("node {0:?} is given more than once as a child")]
    DuplicateChild(NodeId),

    /// A capability was used which was not supplied to the tree.
    #[error("{0} is not implemented for this tree")]
    Unimplemented(&'static str),

    /// The tree does not hold its representation invariants.
    #[error("invariant violated: {0}")]
    Invariant(String),
}
