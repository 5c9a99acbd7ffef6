//! domq CSS - selector compiler and matcher
//!
//! Parses the common CSS selector subset (type, `*`, id, class,
//! attribute, the four combinators and a set of pseudo-classes) and
//! evaluates it against a `DomTree`.

mod selectors;
mod parser;
mod matching;

pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, Compound,
    NthExpression, PseudoClass, SelectorComponent, SelectorList, SelectorPart,
};
pub use parser::parse_selector;
pub use matching::{matches, matches_in_scope, query_all};

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector `{selector}` at offset {position}: {message}")]
pub struct SelectorError {
    /// The selector text as given
    pub selector: String,
    /// Byte offset of the problem
    pub position: usize,
    pub message: String,
}
