//! Content arguments of insertion methods
//!
//! Content is resolved once into source node lists. Each placement then
//! takes a fresh copy: a deep clone when source and target share a
//! document, an import across arenas otherwise.

use domq_dom::{Document, NodeId};

use crate::node_set::{DocHandle, NodeSet};
use crate::Result;

/// One content item: markup or existing nodes
#[derive(Debug, Clone)]
pub enum Content {
    Markup(String),
    Nodes(NodeSet),
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

impl From<NodeSet> for Content {
    fn from(set: NodeSet) -> Self {
        Content::Nodes(set)
    }
}

impl From<&NodeSet> for Content {
    fn from(set: &NodeSet) -> Self {
        Content::Nodes(set.clone())
    }
}

/// Ordered list of content items
#[derive(Debug, Clone, Default)]
pub struct Contents(pub(crate) Vec<Content>);

impl Contents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, content: impl Into<Content>) -> Self {
        self.0.push(content.into());
        self
    }
}

impl From<Content> for Contents {
    fn from(content: Content) -> Self {
        Contents(vec![content])
    }
}

impl From<&str> for Contents {
    fn from(markup: &str) -> Self {
        Contents(vec![markup.into()])
    }
}

impl From<String> for Contents {
    fn from(markup: String) -> Self {
        Contents(vec![markup.into()])
    }
}

impl From<NodeSet> for Contents {
    fn from(set: NodeSet) -> Self {
        Contents(vec![set.into()])
    }
}

impl From<&NodeSet> for Contents {
    fn from(set: &NodeSet) -> Self {
        Contents(vec![set.into()])
    }
}

impl From<Vec<Content>> for Contents {
    fn from(items: Vec<Content>) -> Self {
        Contents(items)
    }
}

impl From<Vec<&str>> for Contents {
    fn from(items: Vec<&str>) -> Self {
        Contents(items.into_iter().map(Content::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Contents {
    fn from(items: [&str; N]) -> Self {
        Contents(items.into_iter().map(Content::from).collect())
    }
}

impl From<Vec<NodeSet>> for Contents {
    fn from(items: Vec<NodeSet>) -> Self {
        Contents(items.into_iter().map(Content::from).collect())
    }
}

/// Resolved content item
pub(crate) struct Source {
    pub(crate) doc: DocHandle,
    pub(crate) nodes: Vec<NodeId>,
    /// Came from a node set (and may need removing from its old place)
    pub(crate) from_set: bool,
}

/// Resolve content for insertion into `target`'s document.
///
/// Markup is parsed into a scratch document carrying the target's parse
/// options, so every placement imports it.
pub(crate) fn resolve(contents: Contents, target: &DocHandle) -> Result<Vec<Source>> {
    contents.0.into_iter()
        .map(|content| match content {
            Content::Markup(markup) => {
                let scratch = DocHandle::new(Document::new(), target.options().clone());
                let nodes = scratch.parse_fragment(&markup);
                Ok(Source { doc: scratch, nodes, from_set: false })
            }
            Content::Nodes(set) => {
                let nodes = set.live_members()?;
                Ok(Source { doc: set.doc.clone(), nodes, from_set: true })
            }
        })
        .collect()
}

/// Fresh detached copy of `node` inside `target`
pub(crate) fn materialize(source: &DocHandle, node: NodeId, target: &DocHandle) -> Result<NodeId> {
    if source.same(target) {
        return Ok(target.borrow_mut().tree_mut().clone_subtree(node)?);
    }
    let source_doc = source.borrow();
    let copy = target.borrow_mut().tree_mut().import_subtree(source_doc.tree(), node)?;
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_resolves_into_scratch_document() {
        let target = NodeSet::parse("<div></div>");
        let sources = resolve(Contents::from(["<a></a>", "<b></b>text"]), &target.doc).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].nodes.len(), 2);
        assert!(!sources[0].doc.same(&target.doc));
        assert!(!sources[0].from_set);
    }

    #[test]
    fn test_materialize_clones_within_document() {
        let set = NodeSet::parse("<p><b>x</b></p>");
        let p = set.node_ids()[0];
        let copy = materialize(&set.doc, p, &set.doc).unwrap();
        assert_ne!(copy, p);
        let document = set.doc.borrow();
        assert_eq!(document.tree().parent(copy), None);
        assert_eq!(domq_html::outer_html(document.tree(), copy), "<p><b>x</b></p>");
    }

    #[test]
    fn test_materialize_imports_across_documents() {
        let source = NodeSet::parse("<i>y</i>");
        let target = NodeSet::parse("<div></div>");
        let node = source.node_ids()[0];
        let copy = materialize(&source.doc, node, &target.doc).unwrap();
        let document = target.doc.borrow();
        assert_eq!(domq_html::outer_html(document.tree(), copy), "<i>y</i>");
    }
}
