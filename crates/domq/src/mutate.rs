//! Mutation engine
//!
//! Every insertion resolves its content once, then makes a fresh copy per
//! target and places it with a single tree primitive. Errors surface per
//! target; targets already handled keep their changes.

use domq_dom::{DomTree, NodeId, NodeOperations};
use tracing::debug;

use crate::content::{Contents, Source, materialize, resolve};
use crate::node_set::NodeSet;
use crate::selector::Selector;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Append,
    Prepend,
    Before,
    After,
}

impl Placement {
    fn name(self) -> &'static str {
        match self {
            Placement::Append => "append",
            Placement::Prepend => "prepend",
            Placement::Before => "before",
            Placement::After => "after",
        }
    }

    fn place(self, tree: &mut DomTree, target: NodeId, node: NodeId) -> Result<()> {
        match self {
            Placement::Append => {
                tree.append_child(target, node)?;
            }
            Placement::Prepend => {
                let first = tree.first_child(target);
                tree.insert_before(target, node, first)?;
            }
            Placement::Before => {
                let parent = tree.parent(target).ok_or(Error::StaleNode(target))?;
                tree.insert_before(parent, node, Some(target))?;
            }
            Placement::After => {
                let parent = tree.parent(target).ok_or(Error::StaleNode(target))?;
                let next = tree.next_sibling(target);
                tree.insert_before(parent, node, next)?;
            }
        }
        Ok(())
    }
}

/// Progress of `wrap_all` over the target list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WrapAllState {
    AwaitingWrapper,
    WrapperPlaced { slot: NodeId },
}

impl NodeSet {
    /// Append copies of `contents` to every element member
    pub fn append(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        self.insert(&sources, Placement::Append)?;
        Ok(self)
    }

    /// Insert copies of `contents` as first children of every element
    /// member; several items end up in reverse order
    pub fn prepend(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        self.insert(&sources, Placement::Prepend)?;
        Ok(self)
    }

    /// Insert copies of `contents` before every member
    pub fn before(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        self.insert(&sources, Placement::Before)?;
        Ok(self)
    }

    /// Insert copies of `contents` directly after every member
    pub fn after(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        self.insert(&sources, Placement::After)?;
        Ok(self)
    }

    /// Move the members to the end of every node `target` resolves to.
    ///
    /// Returns the inserted copies.
    pub fn append_to(&mut self, target: impl Into<Selector>) -> Result<NodeSet> {
        self.move_into(target.into(), Placement::Append)
    }

    /// Move the members to the start of every node `target` resolves to.
    ///
    /// Returns the inserted copies.
    pub fn prepend_to(&mut self, target: impl Into<Selector>) -> Result<NodeSet> {
        self.move_into(target.into(), Placement::Prepend)
    }

    fn move_into(&mut self, target: Selector, placement: Placement) -> Result<NodeSet> {
        let targets = self.resolve_target(target, None)?;
        let sources = resolve(Contents::from(&*self), &targets.doc)?;
        let inserted = targets.insert(&sources, placement)?;
        self.remove()?;
        Ok(targets.scoped(inserted))
    }

    fn insert(&self, sources: &[Source], placement: Placement) -> Result<Vec<NodeId>> {
        let targets = self.live_members()?;
        let mut inserted = Vec::new();
        for &target in &targets {
            match placement {
                Placement::Append | Placement::Prepend => {
                    if !self.doc.borrow().tree().is_element(target) {
                        continue;
                    }
                }
                Placement::Before | Placement::After => {
                    self.positional_parent(target, placement.name())?;
                }
            }
            for source in sources {
                for &node in &source.nodes {
                    let copy = materialize(&source.doc, node, &self.doc)?;
                    placement.place(self.doc.borrow_mut().tree_mut(), target, copy)?;
                    inserted.push(copy);
                }
            }
        }
        debug!(operation = placement.name(), targets = targets.len(), inserted = inserted.len(), "inserted content");
        Ok(inserted)
    }

    /// Parent of `target`, which must be attached below an element
    fn positional_parent(&self, target: NodeId, operation: &'static str) -> Result<NodeId> {
        let document = self.doc.borrow();
        let tree = document.tree();
        let parent = tree.parent(target).ok_or(Error::StaleNode(target))?;
        if parent == NodeId::ROOT {
            let tag = tree.get(target).map(|n| n.node_name().to_string()).unwrap_or_default();
            return Err(Error::InvalidStructure { operation, tag });
        }
        Ok(parent)
    }

    /// Replace every member with copies of `contents`.
    ///
    /// The replaced members are detached (not freed) and returned; node-set
    /// content is removed from its original place afterwards.
    pub fn replace_with(&self, contents: impl Into<Contents>) -> Result<NodeSet> {
        let sources = resolve(contents.into(), &self.doc)?;
        let mut removed = Vec::new();
        for target in self.live_members()? {
            let parent = self.doc.borrow().tree().parent(target).ok_or(Error::StaleNode(target))?;
            for source in &sources {
                for &node in &source.nodes {
                    let copy = materialize(&source.doc, node, &self.doc)?;
                    self.doc.borrow_mut().tree_mut().insert_before(parent, copy, Some(target))?;
                }
            }
            self.doc.borrow_mut().tree_mut().remove_child(parent, target)?;
            removed.push(target);
        }

        for source in sources.iter().filter(|s| s.from_set) {
            let mut document = source.doc.borrow_mut();
            for &node in &source.nodes {
                let replaced = source.doc.same(&self.doc) && removed.contains(&node);
                if !replaced && document.tree().contains(node) {
                    document.release(node)?;
                }
            }
        }
        debug!(replaced = removed.len(), "replaced nodes");
        Ok(self.scoped(removed))
    }

    /// Wrap every member in its own copy of the wrapper structure
    pub fn wrap(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        for target in self.live_members()? {
            self.positional_parent(target, "wrap")?;
            for (source, node) in wrapper_nodes(&sources) {
                let wrapper = materialize(&source.doc, node, &self.doc)?;
                let mut document = self.doc.borrow_mut();
                let tree = document.tree_mut();
                let parent = tree.parent(target).ok_or(Error::StaleNode(target))?;
                tree.replace_child(parent, wrapper, target)?;
                let slot = innermost(tree, wrapper);
                tree.append_child(slot, target)?;
            }
        }
        Ok(self)
    }

    /// Wrap all members in a single wrapper placed at the first member
    pub fn wrap_all(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let sources = resolve(contents.into(), &self.doc)?;
        let Some((source, node)) = wrapper_nodes(&sources).into_iter().next() else {
            return Ok(self);
        };

        let mut state = WrapAllState::AwaitingWrapper;
        for target in self.live_members()? {
            let parent = self.positional_parent(target, "wrap_all")?;
            state = match state {
                WrapAllState::AwaitingWrapper => {
                    let wrapper = materialize(&source.doc, node, &self.doc)?;
                    let mut document = self.doc.borrow_mut();
                    let tree = document.tree_mut();
                    tree.replace_child(parent, wrapper, target)?;
                    let slot = innermost(tree, wrapper);
                    tree.append_child(slot, target)?;
                    WrapAllState::WrapperPlaced { slot }
                }
                WrapAllState::WrapperPlaced { slot } => {
                    self.doc.borrow_mut().tree_mut().append_child(slot, target)?;
                    state
                }
            };
        }
        Ok(self)
    }

    /// Wrap the child nodes of every member
    pub fn wrap_inner(&self, contents: impl Into<Contents>) -> Result<&Self> {
        let contents = contents.into();
        for member in self.live_members()? {
            let children = self.scoped(self.doc.borrow().tree().child_ids(member));
            children.wrap_all(contents.clone())?;
        }
        Ok(self)
    }

    /// Remove every member, keeping its children in its place.
    ///
    /// The children take the member's own position among its siblings;
    /// they are not moved to the end of the parent.
    ///
    /// Returns the parents. When any member is root-level nothing changes
    /// and the set itself is returned.
    pub fn unwrap(&self) -> Result<NodeSet> {
        let members = self.live_members()?;
        {
            let document = self.doc.borrow();
            let tree = document.tree();
            if members.iter().any(|&id| tree.is_root_level(id)) {
                return Ok(self.clone());
            }
        }

        let mut parents = Vec::new();
        for member in members {
            let mut document = self.doc.borrow_mut();
            let parent = document.tree().parent(member).ok_or(Error::StaleNode(member))?;
            for child in document.tree().child_ids(member) {
                document.tree_mut().insert_before(parent, child, Some(member))?;
            }
            document.release(member)?;
            parents.push(parent);
        }
        Ok(self.scoped(parents))
    }

    /// Detach and free every member, then empty the set
    pub fn remove(&mut self) -> Result<&mut Self> {
        let members = self.node_ids();
        let mut document = self.doc.borrow_mut();
        let mut freed = 0;
        for id in members {
            // nested members go with their ancestor
            if document.tree().contains(id) {
                freed += document.release(id)?;
            }
        }
        drop(document);
        debug!(freed, "removed nodes");
        self.nodes.clear();
        self.root = false;
        Ok(self)
    }

    /// Same as [`NodeSet::remove`]
    pub fn empty(&mut self) -> Result<&mut Self> {
        self.remove()
    }

    /// Remove the members matching `selector`; returns the emptied filtered
    /// set and drops the removed members from this one
    pub fn remove_matching(&mut self, selector: impl Into<Selector>) -> Result<NodeSet> {
        let mut matched = self.filter(selector)?;
        matched.remove()?;
        if !self.root {
            let document = self.doc.borrow();
            self.nodes.retain(|&id| document.tree().contains(id));
        }
        Ok(matched)
    }
}

/// Element nodes of the content, usable as wrappers
fn wrapper_nodes(sources: &[Source]) -> Vec<(&Source, NodeId)> {
    sources.iter()
        .flat_map(|source| {
            let document = source.doc.borrow();
            let nodes: Vec<_> = source.nodes.iter()
                .copied()
                .filter(|&node| document.tree().is_element(node))
                .map(|node| (source, node))
                .collect();
            nodes
        })
        .collect()
}

/// Innermost element of a wrapper, following first element children
fn innermost(tree: &DomTree, wrapper: NodeId) -> NodeId {
    let mut slot = wrapper;
    while let Some(child) = tree.element_children(slot).into_iter().next() {
        slot = child;
    }
    slot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innermost_follows_first_element() {
        let set = NodeSet::parse("<div>t<p><b></b></p><i></i></div>");
        let div = set.node_ids()[0];
        let document = set.doc.borrow();
        let slot = innermost(document.tree(), div);
        assert_eq!(document.tree().tag_name(slot), Some("b"));
    }

    #[test]
    fn test_wrap_all_state_machine() {
        let set = NodeSet::parse("<section><a></a><b></b><c></c></section>");
        set.find("a, c").unwrap().wrap_all("<div><span></span></div>").unwrap();
        assert_eq!(set.to_string(), "<section><div><span><a></a><c></c></span></div><b></b></section>");
    }

    #[test]
    fn test_append_skips_non_element_members() {
        let set = NodeSet::parse("<p></p>text");
        set.append("<i></i>").unwrap();
        assert_eq!(set.to_string(), "<p><i></i></p>text");
    }

    #[test]
    fn test_remove_nested_members() {
        let set = NodeSet::parse("<div><p><b></b></p></div>");
        let mut nested = set.find("p, b").unwrap();
        nested.remove().unwrap();
        assert!(nested.is_empty());
        assert_eq!(set.to_string(), "<div></div>");
    }
}
