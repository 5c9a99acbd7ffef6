//! DOM Tree (arena-based allocation)
//!
//! Slots are reused through a free list; every reuse bumps the slot's
//! generation so that ids issued for the previous occupant stop resolving.

use std::collections::HashMap;

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId, NodeOperations};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owned copy of a subtree, used to clone within a tree and to import
/// between trees.
#[derive(Debug, Clone)]
struct Subtree {
    data: NodeData,
    children: Vec<Subtree>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot { generation: 0, node: Some(Node::document()) }],
            free_list: Vec::new(),
            live: 1,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID; `None` once the node has been freed
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Check whether `id` refers to a live node of this tree
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::Stale(id))
    }

    /// Number of live nodes, the document node included
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    /// Create a detached node
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        self.alloc(Node::new(data))
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.create_node(NodeData::Comment(text.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.some())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.some())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child.some())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.some())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.some())
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Ids of all child nodes, in order
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Ids of the element children, in order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Nearest following sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// Nearest preceding sibling that is an element
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.prev_sibling(sibling);
        }
        None
    }

    /// Strict ancestors, nearest first (the document node included)
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE),
        }
    }

    /// Strict descendants in document order (pre-order)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).map(Node::is_element).unwrap_or(false)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Whether the node is connected to the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == NodeId::ROOT {
            return true;
        }
        self.contains(id) && self.ancestors(id).last() == Some(NodeId::ROOT)
    }

    /// Whether the node's parent is the document node
    pub fn is_root_level(&self, id: NodeId) -> bool {
        self.parent(id) == Some(NodeId::ROOT)
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if !parent.is_valid() {
            return;
        }

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = next;
        }

        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Link an unlinked `child` before `before` (`NONE` appends)
    fn link_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        let prev = if before.is_valid() {
            self.get(before).map(|n| n.prev_sibling).unwrap_or(NodeId::NONE)
        } else {
            self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE)
        };

        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = before;
        }

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = child;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = child;
        }

        if let Some(n) = self.get_mut(before) {
            n.prev_sibling = child;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = child;
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.is_document() {
            return Err(DomError::InvalidNodeType(child));
        }
        if !parent_node.is_container() || child == parent || self.is_ancestor_of(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink a node from its parent; the node stays allocated
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Detach a node and free it together with its whole subtree.
    ///
    /// Returns the freed ids; none of them resolves afterwards.
    pub fn release(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        if self.node(id)?.is_document() {
            return Err(DomError::InvalidNodeType(id));
        }
        self.unlink(id);

        let mut freed = vec![id];
        freed.extend(self.descendants(id));
        for &node in &freed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(node.index);
            self.live -= 1;
        }
        Ok(freed)
    }

    fn snapshot(&self, id: NodeId) -> DomResult<Subtree> {
        let node = self.node(id)?;
        let children = self.children(id)
            .map(|(child, _)| self.snapshot(child))
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Subtree { data: node.data.clone(), children })
    }

    fn instantiate(&mut self, subtree: &Subtree) -> NodeId {
        let id = self.create_node(subtree.data.clone());
        for child in &subtree.children {
            let child_id = self.instantiate(child);
            self.link_before(id, child_id, NodeId::NONE);
        }
        id
    }

    /// Deep-copy a subtree of this tree into a new detached subtree
    pub fn clone_subtree(&mut self, id: NodeId) -> DomResult<NodeId> {
        if self.node(id)?.is_document() {
            return Err(DomError::InvalidNodeType(id));
        }
        let subtree = self.snapshot(id)?;
        Ok(self.instantiate(&subtree))
    }

    /// Deep-copy a subtree of another tree into this one (detached)
    pub fn import_subtree(&mut self, source: &DomTree, id: NodeId) -> DomResult<NodeId> {
        if source.node(id)?.is_document() {
            return Err(DomError::InvalidNodeType(id));
        }
        let subtree = source.snapshot(id)?;
        Ok(self.instantiate(&subtree))
    }

    /// DOM `textContent`: concatenated descendant text for containers
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(t) => t.content.clone(),
            NodeData::Comment(c) => c.clone(),
            NodeData::ProcessingInstruction { data, .. } => data.clone(),
            NodeData::Doctype { .. } => String::new(),
            NodeData::Element(_) | NodeData::Document => self.descendants(id)
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
        }
    }

    /// Position of every live node in document order.
    ///
    /// Attached nodes come first (pre-order from the document node),
    /// followed by detached subtrees in slot order.
    pub fn document_order(&self) -> HashMap<NodeId, usize> {
        let mut order = HashMap::with_capacity(self.live);
        order.insert(NodeId::ROOT, 0);
        for id in self.descendants(NodeId::ROOT) {
            let position = order.len();
            order.insert(id, position);
        }

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(node) = &slot.node else {
                continue;
            };
            let id = NodeId { index: index as u32, generation: slot.generation };
            if id == NodeId::ROOT || node.parent.is_valid() {
                continue;
            }
            let position = order.len();
            order.insert(id, position);
            for descendant in self.descendants(id) {
                let position = order.len();
                order.insert(descendant, position);
            }
        }
        order
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperations for DomTree {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link_before(parent, child, NodeId::NONE);
        Ok(child)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(child)
    }

    fn insert_before(&mut self, parent: NodeId, new_child: NodeId, ref_child: Option<NodeId>) -> DomResult<NodeId> {
        self.check_insert(parent, new_child)?;
        let before = match ref_child {
            Some(reference) => {
                if self.node(reference)?.parent != parent {
                    return Err(DomError::NotAChild { parent, child: reference });
                }
                if reference == new_child {
                    return Ok(new_child);
                }
                reference
            }
            None => NodeId::NONE,
        };
        self.unlink(new_child);
        self.link_before(parent, new_child, before);
        Ok(new_child)
    }

    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> DomResult<NodeId> {
        if self.node(old_child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child: old_child });
        }
        self.check_insert(parent, new_child)?;
        if new_child == old_child {
            return Ok(old_child);
        }
        self.unlink(new_child);
        let anchor = self.get(old_child).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        self.unlink(old_child);
        self.link_before(parent, new_child, anchor);
        Ok(old_child)
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        if deep {
            return self.clone_subtree(node);
        }
        let source = self.node(node)?;
        if source.is_document() {
            return Err(DomError::InvalidNodeType(node));
        }
        let data = source.data.clone();
        Ok(self.create_node(data))
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.some()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over the strict descendants of a node
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.some()?;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };
        Some(current)
    }
}

/// Iterator over the strict ancestors of a node, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next.some()?;
        self.next = self.tree.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE);
        Some(id)
    }
}
