//! Error type of the query and mutation API

use domq_css::SelectorError;
use domq_dom::{DomError, NodeId};

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed structural selector
    #[error(transparent)]
    SelectorSyntax(#[from] SelectorError),

    /// Mutation relative to a node whose parent is the document node
    #[error("cannot {operation} relative to root-level element <{tag}>")]
    InvalidStructure { operation: &'static str, tag: String },

    /// A member was freed, or a positional mutation targets a detached node
    #[error("stale node reference {0}")]
    StaleNode(NodeId),

    /// Property not supported by `set_prop`
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// Tree operation rejected (hierarchy violation, wrong node type)
    #[error(transparent)]
    Dom(DomError),
}

impl From<DomError> for Error {
    fn from(err: DomError) -> Self {
        match err {
            DomError::Stale(id) => Error::StaleNode(id),
            other => Error::Dom(other),
        }
    }
}
