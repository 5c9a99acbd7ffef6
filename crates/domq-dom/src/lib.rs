//! domq DOM - Document Object Model
//!
//! Arena-based DOM tree with generational node ids. A freed slot bumps its
//! generation, so a handle that outlives its node is detected instead of
//! silently aliasing whatever reuses the slot.

mod node;
mod tree;
mod document;
mod operations;
mod classlist;
mod style;
mod data;

pub use node::{Node, NodeData, NodeType, ElementData, TextData, Attribute};
pub use tree::{DomTree, Children, Descendants, Ancestors};
pub use document::Document;
pub use operations::{DomError, DomResult, NodeOperations};
pub use classlist::TokenList;
pub use style::StyleMap;
pub use data::{DataStore, DataRecord};

/// Node identifier (slot index plus generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// The document node of every tree
    pub const ROOT: NodeId = NodeId { index: 0, generation: 0 };

    /// Sentinel for "no node" in parent/child/sibling links
    pub const NONE: NodeId = NodeId { index: u32::MAX, generation: 0 };

    /// Check that this id is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self.index != u32::MAX
    }

    /// Convert a link into an `Option`
    #[inline]
    pub fn some(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    /// Slot index in the arena
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this id was issued for
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
