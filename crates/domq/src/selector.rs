//! Selector classification
//!
//! Every selector argument is classified once into a [`Selector`] and then
//! compiled against the set it is applied to.

use std::fmt;
use std::rc::Rc;

use domq_css::{SelectorList, matches, parse_selector, query_all};
use domq_dom::NodeId;

use crate::node_set::NodeSet;
use crate::Result;

type Predicate = Rc<dyn Fn(&NodeSet, usize) -> bool>;

/// Selector argument of query methods
#[derive(Clone)]
pub enum Selector {
    /// CSS-like expression, compiled to a `SelectorList`
    Structural(String),
    /// Markup, parsed into a fresh document on demand
    Markup(String),
    /// Called with a single-node set and its index
    Predicate(Predicate),
    /// Existing node set, compared by node identity
    Literal(NodeSet),
}

impl Selector {
    pub fn predicate(f: impl Fn(&NodeSet, usize) -> bool + 'static) -> Self {
        Selector::Predicate(Rc::new(f))
    }

    fn classify(text: String) -> Self {
        if text.contains('<') {
            Selector::Markup(text)
        } else {
            Selector::Structural(text)
        }
    }

    pub(crate) fn compile(self, context: &NodeSet) -> Result<Compiled> {
        Ok(match self {
            Selector::Structural(text) => Compiled::Structural(parse_selector(&text)?),
            Selector::Markup(markup) => {
                Compiled::Literal(NodeSet::parse_with(&markup, context.doc.options().clone()))
            }
            Selector::Predicate(f) => Compiled::Predicate(f),
            Selector::Literal(set) => Compiled::Literal(set),
        })
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Self::classify(text.to_string())
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Self::classify(text)
    }
}

impl From<&String> for Selector {
    fn from(text: &String) -> Self {
        Self::classify(text.clone())
    }
}

impl From<NodeSet> for Selector {
    fn from(set: NodeSet) -> Self {
        Selector::Literal(set)
    }
}

impl From<&NodeSet> for Selector {
    fn from(set: &NodeSet) -> Self {
        Selector::Literal(set.clone())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Structural(text) => f.debug_tuple("Structural").field(text).finish(),
            Selector::Markup(markup) => f.debug_tuple("Markup").field(markup).finish(),
            Selector::Predicate(_) => f.write_str("Predicate(..)"),
            Selector::Literal(set) => f.debug_tuple("Literal").field(set).finish(),
        }
    }
}

/// Selector ready for evaluation
pub(crate) enum Compiled {
    Structural(SelectorList),
    Predicate(Predicate),
    Literal(NodeSet),
}

impl Compiled {
    /// Test one member of `set`, evaluated against the whole document
    pub(crate) fn matches_member(&self, set: &NodeSet, node: NodeId, index: usize) -> bool {
        match self {
            Compiled::Structural(list) => {
                let document = set.doc.borrow();
                matches(document.tree(), node, list)
            }
            Compiled::Predicate(f) => f(&set.scoped(vec![node]), index),
            Compiled::Literal(literal) => literal.contains_node(&set.doc, node),
        }
    }

    /// Search the strict descendants of `scope` (document order)
    pub(crate) fn search(&self, set: &NodeSet, scope: NodeId) -> Vec<NodeId> {
        match self {
            Compiled::Structural(list) => {
                let document = set.doc.borrow();
                query_all(document.tree(), scope, list)
            }
            Compiled::Predicate(f) => {
                let candidates: Vec<NodeId> = {
                    let document = set.doc.borrow();
                    let tree = document.tree();
                    tree.descendants(scope).filter(|&id| tree.is_element(id)).collect()
                };
                candidates.into_iter()
                    .enumerate()
                    .filter(|&(index, id)| f(&set.scoped(vec![id]), index))
                    .map(|(_, id)| id)
                    .collect()
            }
            Compiled::Literal(literal) => {
                if !literal.doc.same(&set.doc) {
                    return Vec::new();
                }
                let members = literal.node_ids();
                let document = set.doc.borrow();
                let tree = document.tree();
                let mut found: Vec<NodeId> = members.into_iter()
                    .filter(|&id| tree.is_ancestor_of(scope, id))
                    .collect();
                let order = tree.document_order();
                found.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
                found
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(matches!(Selector::from("div > p"), Selector::Structural(_)));
        assert!(matches!(Selector::from("<p>x</p>"), Selector::Markup(_)));
        assert!(matches!(Selector::from(String::from("a")), Selector::Structural(_)));
        let set = NodeSet::parse("<a></a>");
        assert!(matches!(Selector::from(&set), Selector::Literal(_)));
        assert!(matches!(Selector::predicate(|_, _| true), Selector::Predicate(_)));
    }

    #[test]
    fn test_compile_reports_syntax_error() {
        let set = NodeSet::parse("<a></a>");
        let err = Selector::from("div >").compile(&set).err();
        assert!(matches!(err, Some(crate::Error::SelectorSyntax(_))));
    }
}
