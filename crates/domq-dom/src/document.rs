//! Document - owns the tree and the per-node data side table

use tracing::debug;

use crate::{DataStore, DomResult, DomTree, NodeId, NodeOperations};

/// A markup document
///
/// Freeing nodes through the document (rather than the tree directly)
/// also drops their data records.
#[derive(Debug, Default)]
pub struct Document {
    tree: DomTree,
    data: DataStore,
}

impl Document {
    /// Create an empty document (document node only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already built tree
    pub fn from_tree(tree: DomTree) -> Self {
        Self { tree, data: DataStore::default() }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataStore {
        &mut self.data
    }

    /// First element child of the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.element_children(self.tree.root()).into_iter().next()
    }

    /// Get element by ID (first in document order)
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    /// Detach and free a subtree, pruning its data records.
    ///
    /// Returns the number of freed nodes.
    pub fn release(&mut self, id: NodeId) -> DomResult<usize> {
        let freed = self.tree.release(id)?;
        self.data.prune(&freed);
        debug!(node = %id, freed = freed.len(), "released subtree");
        Ok(freed.len())
    }

    /// Free every child of `id`
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        for child in self.tree.child_ids(id) {
            self.release(child)?;
        }
        Ok(())
    }

    /// Replace all children of `id` with a single text node
    /// (no node at all for an empty string)
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.clear_children(id)?;
        if !text.is_empty() {
            let node = self.tree.create_text(text);
            self.tree.append_child(id, node)?;
        }
        Ok(())
    }
}
