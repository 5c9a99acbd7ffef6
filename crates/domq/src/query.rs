//! Query engine: selection, filtering, traversal and positional access

use std::collections::HashSet;

use domq_dom::NodeId;
use tracing::trace;

use crate::node_set::NodeSet;
use crate::selector::Selector;
use crate::Result;

impl NodeSet {
    /// Descendants of the members matching `selector`, in document order
    pub fn find(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        let compiled = selector.into().compile(self)?;
        let scopes = if self.root { vec![NodeId::ROOT] } else { self.live_members()? };

        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for scope in scopes {
            found.extend(compiled.search(self, scope).into_iter().filter(|id| seen.insert(*id)));
        }
        self.sort_document_order(&mut found);
        trace!(found = found.len(), "find");
        Ok(self.scoped(found))
    }

    /// Members matching `selector`, in set order
    pub fn filter(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        self.partition(selector, true)
    }

    /// Members not matching `selector`, in set order
    pub fn not(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        self.partition(selector, false)
    }

    fn partition(&self, selector: impl Into<Selector>, keep: bool) -> Result<NodeSet> {
        let compiled = selector.into().compile(self)?;
        let kept = self.live_members()?
            .into_iter()
            .enumerate()
            .filter(|&(index, id)| compiled.matches_member(self, id, index) == keep)
            .map(|(_, id)| id)
            .collect();
        Ok(self.scoped(kept))
    }

    /// Whether at least one member matches `selector`
    pub fn is(&self, selector: impl Into<Selector>) -> Result<bool> {
        let compiled = selector.into().compile(self)?;
        Ok(self.live_members()?
            .into_iter()
            .enumerate()
            .any(|(index, id)| compiled.matches_member(self, id, index)))
    }

    /// Members with at least one descendant matching `selector`
    pub fn has(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        let compiled = selector.into().compile(self)?;
        let kept = self.live_members()?
            .into_iter()
            .filter(|&id| !compiled.search(self, id).is_empty())
            .collect();
        Ok(self.scoped(kept))
    }

    /// Per member, the first of itself and its element ancestors matching
    /// `selector`
    pub fn closest(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        let compiled = selector.into().compile(self)?;
        let mut found = Vec::new();
        for member in self.live_members()? {
            let chain: Vec<NodeId> = {
                let document = self.doc.borrow();
                let tree = document.tree();
                std::iter::once(member)
                    .chain(tree.ancestors(member))
                    .take_while(|&id| tree.is_element(id))
                    .collect()
            };
            if let Some(hit) = chain.into_iter().find(|&id| compiled.matches_member(self, id, 0)) {
                found.push(hit);
            }
        }
        Ok(self.scoped(found))
    }

    /// Union with the nodes `selector` resolves to in this document
    pub fn add(&self, selector: impl Into<Selector>) -> Result<NodeSet> {
        let other = self.resolve_target(selector.into(), None)?;
        self.union(&other)
    }

    /// Union with the nodes `selector` resolves to within `context`
    pub fn add_in(&self, selector: impl Into<Selector>, context: &NodeSet) -> Result<NodeSet> {
        let other = self.resolve_target(selector.into(), Some(context))?;
        self.union(&other)
    }

    /// Resolve a selector to a node set: structural and predicate selectors
    /// search `context` (or this document), markup is parsed into a fresh
    /// document, literals are taken as they are
    pub(crate) fn resolve_target(&self, selector: Selector, context: Option<&NodeSet>) -> Result<NodeSet> {
        match selector {
            Selector::Structural(_) | Selector::Predicate(_) => {
                let base = context.cloned().unwrap_or_else(|| self.document());
                base.find(selector)
            }
            Selector::Markup(markup) => Ok(NodeSet::parse_with(&markup, self.doc.options().clone())),
            Selector::Literal(set) => Ok(set),
        }
    }

    fn union(&self, other: &NodeSet) -> Result<NodeSet> {
        let mut nodes = self.live_members()?;
        let incoming = other.live_members()?;
        if other.doc.same(&self.doc) {
            nodes.extend(incoming);
        } else {
            let source = other.doc.borrow();
            let mut document = self.doc.borrow_mut();
            for id in incoming {
                nodes.push(document.tree_mut().import_subtree(source.tree(), id)?);
            }
        }
        Ok(self.scoped(nodes))
    }

    /// Number of element siblings before the first element member
    pub fn index(&self) -> Result<Option<usize>> {
        let members = self.live_members()?;
        let document = self.doc.borrow();
        let tree = document.tree();
        Ok(members.into_iter()
            .find(|&id| tree.is_element(id))
            .map(|first| {
                let mut count = 0;
                let mut current = tree.prev_element_sibling(first);
                while let Some(id) = current {
                    count += 1;
                    current = tree.prev_element_sibling(id);
                }
                count
            }))
    }

    /// Position of the first member matching `selector`
    pub fn index_of(&self, selector: impl Into<Selector>) -> Result<Option<usize>> {
        let compiled = selector.into().compile(self)?;
        Ok(self.live_members()?
            .into_iter()
            .position(|id| compiled.matches_member(self, id, 0)))
    }

    /// Element children of every member (root set: top-level elements)
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn children(&self) -> Result<NodeSet> {
        if self.root {
            let document = self.doc.borrow();
            let tree = document.tree();
            return Ok(self.scoped(tree.element_children(tree.root())));
        }
        self.collect_each(|tree, id| tree.element_children(id))
    }

    /// Child nodes of every member, text and comments included
    pub fn contents(&self) -> Result<NodeSet> {
        if self.root {
            let document = self.doc.borrow();
            let tree = document.tree();
            return Ok(self.scoped(tree.child_ids(tree.root())));
        }
        self.collect_each(|tree, id| tree.child_ids(id))
    }

    /// Element siblings of every member, excluding the member itself
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn siblings(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| match tree.parent(id) {
            Some(parent) => tree.element_children(parent).into_iter().filter(|&s| s != id).collect(),
            None => Vec::new(),
        })
    }

    /// Parent element of every member
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn parent(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| tree.parent(id).filter(|&p| tree.is_element(p)).into_iter().collect())
    }

    /// Next element sibling of every member
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn next(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| tree.next_element_sibling(id).into_iter().collect())
    }

    /// Every following element sibling of every member
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn next_all(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| {
            std::iter::successors(tree.next_element_sibling(id), |&s| tree.next_element_sibling(s)).collect()
        })
    }

    /// Previous element sibling of every member
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn prev(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| tree.prev_element_sibling(id).into_iter().collect())
    }

    /// Every preceding element sibling of every member, in document order
    ///
    /// Narrow the result by chaining [`NodeSet::filter`].
    pub fn prev_all(&self) -> Result<NodeSet> {
        self.collect_each(|tree, id| {
            let mut found: Vec<NodeId> =
                std::iter::successors(tree.prev_element_sibling(id), |&s| tree.prev_element_sibling(s)).collect();
            found.reverse();
            found
        })
    }

    fn collect_each(&self, step: impl Fn(&domq_dom::DomTree, NodeId) -> Vec<NodeId>) -> Result<NodeSet> {
        let members = self.live_members()?;
        let document = self.doc.borrow();
        let found = members.into_iter().flat_map(|id| step(document.tree(), id)).collect();
        Ok(self.scoped(found))
    }

    /// Sub-range of the members.
    ///
    /// A negative `offset` counts from the end; a negative `length` stops
    /// that many members before the end; `None` runs to the end.
    pub fn slice(&self, offset: isize, length: Option<isize>) -> NodeSet {
        let members = self.node_ids();
        let len = members.len() as isize;
        let start = if offset < 0 { len.saturating_add(offset).max(0) } else { offset.min(len) };
        let end = match length {
            None => len,
            Some(length) if length < 0 => len.saturating_add(length).max(start),
            Some(length) => start.saturating_add(length).min(len),
        };
        self.scoped(members[start as usize..end as usize].to_vec())
    }

    /// Member at `index` (negative counts from the end), or an empty set
    pub fn eq(&self, index: isize) -> NodeSet {
        self.slice(index, Some(1))
    }

    /// First member; chain [`NodeSet::filter`] to narrow it
    pub fn first(&self) -> NodeSet {
        self.eq(0)
    }

    /// Last member; chain [`NodeSet::filter`] to narrow it
    pub fn last(&self) -> NodeSet {
        self.eq(-1)
    }

    /// Deep copies of every member: detached, same document, no data
    pub fn clone_nodes(&self) -> Result<NodeSet> {
        let members = self.live_members()?;
        let mut document = self.doc.borrow_mut();
        let copies = members.into_iter()
            .map(|id| document.tree_mut().clone_subtree(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.scoped(copies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> NodeSet {
        NodeSet::parse("<ul><li id=\"a\">1</li><li id=\"b\" class=\"x\">2</li><li id=\"c\">3</li></ul>")
    }

    fn ids(set: &NodeSet) -> Vec<String> {
        set.iter().map(|n| n.attr("id").unwrap().unwrap_or_default()).collect()
    }

    #[test]
    fn test_slice_bounds() {
        let items = doc().find("li").unwrap();
        assert_eq!(ids(&items.slice(1, None)), vec!["b", "c"]);
        assert_eq!(ids(&items.slice(-2, Some(1))), vec!["b"]);
        assert_eq!(ids(&items.slice(0, Some(-1))), vec!["a", "b"]);
        assert!(items.slice(5, None).is_empty());
        assert!(items.slice(2, Some(-3)).is_empty());
        assert_eq!(ids(&items.slice(1, Some(isize::MAX))), vec!["b", "c"]);
        assert_eq!(ids(&items.slice(isize::MIN, Some(isize::MIN))), Vec::<String>::new());
        assert_eq!(ids(&items.eq(-1)), vec!["c"]);
        assert!(items.eq(3).is_empty());
    }

    #[test]
    fn test_prev_all_is_document_order() {
        let c = doc().find("#c").unwrap();
        assert_eq!(ids(&c.prev_all().unwrap()), vec!["a", "b"]);
        assert_eq!(ids(&c.prev().unwrap()), vec!["b"]);
    }

    #[test]
    fn test_index_counts_preceding_elements() {
        let set = NodeSet::parse("<div><p></p>text<!--c--><p></p><span id=\"t\"></span></div>");
        assert_eq!(set.find("#t").unwrap().index().unwrap(), Some(2));
        assert_eq!(set.find("em").unwrap().index().unwrap(), None);
    }

    #[test]
    fn test_filter_predicate_receives_index() {
        let items = doc().find("li").unwrap();
        let odd = items.filter(Selector::predicate(|_, i| i % 2 == 1)).unwrap();
        assert_eq!(ids(&odd), vec!["b"]);
    }

    #[test]
    fn test_clone_nodes_detached() {
        let set = doc();
        let copies = set.find("li").unwrap().clone_nodes().unwrap();
        assert_eq!(copies.len(), 3);
        assert!(copies.parent().unwrap().is_empty());
        assert_eq!(set.find("li").unwrap().len(), 3);
        assert_eq!(copies.to_string(), "<li id=\"a\">1</li><li id=\"b\" class=\"x\">2</li><li id=\"c\">3</li>");
    }
}
