//! Selector matching
//!
//! Complex selectors are matched right to left: the last compound is
//! checked against the candidate, then combinators walk to ancestors or
//! previous siblings. With a scope, ancestor walks stop below the scope
//! and the first compound must stand in its leading relation to it.

use domq_dom::{DomTree, ElementData, NodeId};
use tracing::trace;

use crate::selectors::{
    Combinator, ComplexSelector, Compound, PseudoClass, SelectorComponent, SelectorList, SelectorPart,
};

/// Check if an element matches a selector list, unscoped
pub fn matches(tree: &DomTree, node: NodeId, list: &SelectorList) -> bool {
    matches_in_scope(tree, node, list, None)
}

/// Check if an element matches a selector list relative to `scope`
pub fn matches_in_scope(tree: &DomTree, node: NodeId, list: &SelectorList, scope: Option<NodeId>) -> bool {
    list.iter().any(|complex| matches_complex(tree, node, complex, scope))
}

/// All elements under `scope` matching the list, in document order.
///
/// A selector starting with `+` or `~` also reaches the scope's following
/// siblings and their descendants.
pub fn query_all(tree: &DomTree, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
    let found: Vec<NodeId> = candidates(tree, scope, list)
        .filter(|&node| matches_in_scope(tree, node, list, Some(scope)))
        .collect();
    trace!(scope = %scope, found = found.len(), "query_all");
    found
}

fn candidates<'t>(tree: &'t DomTree, scope: NodeId, list: &SelectorList) -> impl Iterator<Item = NodeId> + 't {
    let space = if list.has_leading_sibling() {
        tree.parent(scope).unwrap_or(scope)
    } else {
        scope
    };
    tree.descendants(space)
        .filter(move |&node| node != scope && tree.is_element(node))
}

fn matches_complex(tree: &DomTree, node: NodeId, complex: &ComplexSelector, scope: Option<NodeId>) -> bool {
    match complex.parts.len().checked_sub(1) {
        Some(last) => match_part(tree, node, &complex.parts, last, scope),
        None => false,
    }
}

fn match_part(tree: &DomTree, node: NodeId, parts: &[SelectorPart], index: usize, scope: Option<NodeId>) -> bool {
    let part = &parts[index];
    if !matches_compound(tree, node, &part.compound) {
        return false;
    }
    if index == 0 {
        return matches_leading(tree, node, part.combinator, scope);
    }

    let matches_previous = |candidate: NodeId| match_part(tree, candidate, parts, index - 1, scope);
    match part.combinator {
        Combinator::Descendant => tree.ancestors(node)
            .take_while(|&ancestor| Some(ancestor) != scope)
            .any(matches_previous),
        Combinator::Child => tree.parent(node)
            .filter(|&parent| Some(parent) != scope)
            .is_some_and(matches_previous),
        Combinator::NextSibling => tree.prev_element_sibling(node).is_some_and(matches_previous),
        Combinator::SubsequentSibling => preceding_elements(tree, node).any(matches_previous),
    }
}

/// Relation between the first compound and the scope
fn matches_leading(tree: &DomTree, node: NodeId, combinator: Combinator, scope: Option<NodeId>) -> bool {
    match (scope, combinator) {
        (None, Combinator::Descendant) => true,
        (None, Combinator::Child) => !tree.parent(node).is_some_and(|p| tree.is_element(p)),
        (None, _) => false,
        (Some(scope), Combinator::Descendant) => tree.is_ancestor_of(scope, node),
        (Some(scope), Combinator::Child) => tree.parent(node) == Some(scope),
        (Some(scope), Combinator::NextSibling) => tree.prev_element_sibling(node) == Some(scope),
        (Some(scope), Combinator::SubsequentSibling) => preceding_elements(tree, node).any(|s| s == scope),
    }
}

fn preceding_elements(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(tree.prev_element_sibling(node), move |&s| tree.prev_element_sibling(s))
}

fn matches_compound(tree: &DomTree, node: NodeId, compound: &Compound) -> bool {
    let Some(elem) = tree.element(node) else {
        return false;
    };
    compound.0.iter().all(|component| matches_component(tree, node, elem, component))
}

fn matches_component(tree: &DomTree, node: NodeId, elem: &ElementData, component: &SelectorComponent) -> bool {
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.name.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => elem.has_class(class),
        SelectorComponent::Attribute(attr) => {
            let value = elem.attrs.iter()
                .find(|a| a.name.eq_ignore_ascii_case(&attr.name))
                .map(|a| a.value.as_str());
            attr.matches(value)
        }
        SelectorComponent::PseudoClass(pseudo) => matches_pseudo_class(tree, node, elem, pseudo),
    }
}

const FORM_CONTROLS: &[&str] = &["button", "input", "select", "textarea", "optgroup", "option", "fieldset"];

fn matches_pseudo_class(tree: &DomTree, node: NodeId, elem: &ElementData, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Root => tree.parent(node) == Some(tree.root()),
        PseudoClass::Empty => !has_content(tree, node),
        PseudoClass::Parent => has_content(tree, node),
        PseudoClass::FirstChild => tree.prev_element_sibling(node).is_none(),
        PseudoClass::LastChild => tree.next_element_sibling(node).is_none(),
        PseudoClass::OnlyChild => {
            tree.prev_element_sibling(node).is_none() && tree.next_element_sibling(node).is_none()
        }
        PseudoClass::FirstOfType => sibling_position(tree, node, Some(elem.name.as_str())).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = sibling_position(tree, node, Some(elem.name.as_str()));
            index == count
        }
        PseudoClass::OnlyOfType => sibling_position(tree, node, Some(elem.name.as_str())).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(sibling_position(tree, node, None).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = sibling_position(tree, node, None);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(sibling_position(tree, node, Some(elem.name.as_str())).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = sibling_position(tree, node, Some(elem.name.as_str()));
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::Header => {
            let name = elem.name.as_bytes();
            name.len() == 2 && name[0].eq_ignore_ascii_case(&b'h') && (b'1'..=b'6').contains(&name[1])
        }
        PseudoClass::Contains(text) => tree.text_content(node).contains(text.as_str()),
        PseudoClass::Checked => {
            elem.has_attr("checked") || (elem.name == "option" && elem.has_attr("selected"))
        }
        PseudoClass::Selected => elem.name == "option" && elem.has_attr("selected"),
        PseudoClass::Disabled => FORM_CONTROLS.contains(&elem.name.as_str()) && elem.has_attr("disabled"),
        PseudoClass::Enabled => FORM_CONTROLS.contains(&elem.name.as_str()) && !elem.has_attr("disabled"),
        PseudoClass::Not(list) => !matches(tree, node, list),
        PseudoClass::Is(list) => matches(tree, node, list),
        PseudoClass::Has(list) => candidates(tree, node, list)
            .any(|candidate| matches_in_scope(tree, candidate, list, Some(node))),
    }
}

/// Element or non-empty text child present
fn has_content(tree: &DomTree, node: NodeId) -> bool {
    tree.children(node)
        .any(|(_, child)| child.is_element() || child.as_text().is_some_and(|t| !t.is_empty()))
}

/// 1-based position among element siblings (optionally of one tag name),
/// and the number of such siblings
fn sibling_position(tree: &DomTree, node: NodeId, tag: Option<&str>) -> (usize, usize) {
    let siblings = match tree.parent(node) {
        Some(parent) => tree.element_children(parent),
        None => vec![node],
    };
    let mut index = 0;
    let mut count = 0;
    for sibling in siblings {
        let same_kind = match tag {
            Some(tag) => tree.tag_name(sibling).is_some_and(|name| name.eq_ignore_ascii_case(tag)),
            None => true,
        };
        if !same_kind {
            continue;
        }
        count += 1;
        if sibling == node {
            index = count;
        }
    }
    (index, count)
}
