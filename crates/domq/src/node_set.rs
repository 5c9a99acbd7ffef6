//! Node-Set - ordered, duplicate-free view over nodes of one document
//!
//! A `NodeSet` owns no tree resources. It holds a shared handle to its
//! document and a member list; the root set stands for the whole document
//! and computes its members live from the document's top-level nodes.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use domq_dom::{Document, NodeData, NodeId};
use domq_html::{HtmlParser, HtmlSerializer, ParseOptions};
use tracing::debug;

use crate::{Error, Result};

struct Shared {
    document: RefCell<Document>,
    options: ParseOptions,
}

/// Shared handle to a document and the options it was parsed with
#[derive(Clone)]
pub(crate) struct DocHandle(Rc<Shared>);

impl DocHandle {
    pub(crate) fn new(document: Document, options: ParseOptions) -> Self {
        Self(Rc::new(Shared { document: RefCell::new(document), options }))
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Document> {
        self.0.document.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Document> {
        self.0.document.borrow_mut()
    }

    pub(crate) fn options(&self) -> &ParseOptions {
        &self.0.options
    }

    pub(crate) fn same(&self, other: &DocHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Parse markup into this document as detached nodes
    pub(crate) fn parse_fragment(&self, markup: &str) -> Vec<NodeId> {
        let parser = HtmlParser::with_options(self.options().clone());
        let mut document = self.borrow_mut();
        parser.parse_into(markup, document.tree_mut())
    }
}

/// Ordered, duplicate-free set of nodes of one document
#[derive(Clone)]
pub struct NodeSet {
    pub(crate) doc: DocHandle,
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) root: bool,
}

impl NodeSet {
    /// Parse markup into a new document and return its root set
    pub fn parse(markup: &str) -> NodeSet {
        Self::parse_with(markup, ParseOptions::default())
    }

    /// Parse with explicit options; markup inserted into this document
    /// later is parsed with the same options
    pub fn parse_with(markup: &str, options: ParseOptions) -> NodeSet {
        let document = HtmlParser::with_options(options.clone()).parse(markup);
        debug!(nodes = document.tree().len(), "created document");
        Self::root_of(DocHandle::new(document, options))
    }

    /// Root set of an already built document
    pub fn from_document(document: Document) -> NodeSet {
        Self::root_of(DocHandle::new(document, ParseOptions::default()))
    }

    pub(crate) fn root_of(doc: DocHandle) -> NodeSet {
        NodeSet { doc, nodes: Vec::new(), root: true }
    }

    /// Scoped set over the same document; duplicates are dropped, first
    /// occurrence wins
    pub(crate) fn scoped(&self, nodes: Vec<NodeId>) -> NodeSet {
        NodeSet { doc: self.doc.clone(), nodes: unique(nodes), root: false }
    }

    /// Root set of the document this set belongs to
    pub fn document(&self) -> NodeSet {
        Self::root_of(self.doc.clone())
    }

    /// Whether this is the whole-document set
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Current member ids, in set order
    pub fn node_ids(&self) -> Vec<NodeId> {
        if !self.root {
            return self.nodes.clone();
        }
        let document = self.doc.borrow();
        let tree = document.tree();
        tree.children(tree.root())
            .filter(|(_, node)| !matches!(node.data, NodeData::Doctype { .. }))
            .map(|(id, _)| id)
            .collect()
    }

    /// Members, failing on the first one that was freed
    pub(crate) fn live_members(&self) -> Result<Vec<NodeId>> {
        let members = self.node_ids();
        let document = self.doc.borrow();
        match members.iter().find(|&&id| !document.tree().contains(id)) {
            Some(&stale) => Err(Error::StaleNode(stale)),
            None => Ok(members),
        }
    }

    /// Identity membership: same document and same node
    pub(crate) fn contains_node(&self, doc: &DocHandle, node: NodeId) -> bool {
        self.doc.same(doc) && self.node_ids().contains(&node)
    }

    pub(crate) fn sort_document_order(&self, nodes: &mut [NodeId]) {
        let document = self.doc.borrow();
        let order = document.tree().document_order();
        nodes.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
    }

    pub fn len(&self) -> usize {
        self.node_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-node set for the member at `index`
    pub fn get(&self, index: usize) -> Option<NodeSet> {
        self.node_ids().get(index).map(|&id| self.scoped(vec![id]))
    }

    /// Iterate members as single-node sets
    pub fn iter(&self) -> Iter {
        Iter { doc: self.doc.clone(), nodes: self.node_ids().into_iter() }
    }

    /// Run `f` against the owning document
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.doc.borrow())
    }
}

pub(crate) fn unique(nodes: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Iterator over single-node sets
pub struct Iter {
    doc: DocHandle,
    nodes: std::vec::IntoIter<NodeId>,
}

impl Iterator for Iter {
    type Item = NodeSet;

    fn next(&mut self) -> Option<NodeSet> {
        let id = self.nodes.next()?;
        Some(NodeSet { doc: self.doc.clone(), nodes: vec![id], root: false })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = NodeSet;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same(&other.doc) && self.node_ids() == other.node_ids()
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.doc.borrow();
        let tree = document.tree();
        let serializer = HtmlSerializer::new();
        if self.root {
            return f.write_str(&serializer.serialize_outer(tree, tree.root()));
        }
        for &id in self.nodes.iter().filter(|&&id| tree.contains(id)) {
            f.write_str(&serializer.serialize_outer(tree, id))?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("nodes", &self.node_ids())
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_members_skip_doctype() {
        let set = NodeSet::parse("<!DOCTYPE html><html><body></body></html>");
        assert_eq!(set.len(), 1);
        assert!(set.is_root());
    }

    #[test]
    fn test_root_members_are_live() {
        let set = NodeSet::parse("<a></a><b></b>");
        assert_eq!(set.len(), 2);
        let extra = set.doc.parse_fragment("<i></i>");
        {
            let mut document = set.doc.borrow_mut();
            let root = document.tree().root();
            domq_dom::NodeOperations::append_child(document.tree_mut(), root, extra[0]).unwrap();
        }
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_string(), "<a></a><b></b><i></i>");
    }

    #[test]
    fn test_scoped_deduplicates() {
        let set = NodeSet::parse("<a></a><b></b>");
        let ids = set.node_ids();
        let scoped = set.scoped(vec![ids[1], ids[0], ids[1]]);
        assert_eq!(scoped.node_ids(), vec![ids[1], ids[0]]);
        assert_eq!(scoped.to_string(), "<b></b><a></a>");
    }

    #[test]
    fn test_identity_equality() {
        let a = NodeSet::parse("<p></p>");
        let b = NodeSet::parse("<p></p>");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.get(0), a.get(0));
        assert_eq!(a.get(1), None);
    }

    #[test]
    fn test_iter_yields_single_node_sets() {
        let set = NodeSet::parse("<a></a>text<b></b>");
        let parts: Vec<String> = set.iter().map(|n| n.to_string()).collect();
        assert_eq!(parts, vec!["<a></a>", "text", "<b></b>"]);
    }

    #[test]
    fn test_live_members_reports_freed_node() {
        let set = NodeSet::parse("<a></a>");
        let first = set.get(0).unwrap();
        let id = first.node_ids()[0];
        set.doc.borrow_mut().release(id).unwrap();
        assert!(matches!(first.live_members(), Err(Error::StaleNode(stale)) if stale == id));
    }
}
