//! domq HTML - parser and serializer
//!
//! Parsing goes through html5ever's `RcDom` and is converted into the
//! arena tree. Serialization writes HTML5 syntax back out.

mod parser;
mod serializer;

pub use parser::{HtmlParser, ParseOptions};
pub use serializer::HtmlSerializer;

use domq_dom::{Document, DomTree, NodeId};

/// Parse markup with default options
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Utility: Get innerHTML of a node
pub fn inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// Utility: Get outerHTML of a node
pub fn outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}
