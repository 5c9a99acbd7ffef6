//! DOM Node Operations
//!
//! Core node manipulation: appendChild, removeChild, insertBefore,
//! replaceChild, cloneNode.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The id refers to a freed slot (or was never issued by this tree)
    #[error("stale node reference {0}")]
    Stale(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Invalid node type for the operation
    #[error("invalid node type for {0}")]
    InvalidNodeType(NodeId),
    /// Node is not a child of the given parent
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Node operations trait
///
/// Every operation keeps parent, child and sibling links consistent, even
/// when it fails.
pub trait NodeOperations {
    /// Append a child node, detaching it from its current parent first
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Remove a child node (the child stays allocated, detached)
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Insert before a reference node; `None` appends
    fn insert_before(&mut self, parent: NodeId, new_child: NodeId, ref_child: Option<NodeId>) -> DomResult<NodeId>;

    /// Replace a child with another node, returns the replaced child
    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> DomResult<NodeId>;

    /// Clone a node into a new detached node
    fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId>;
}
