//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts it to the arena tree.
//! Fragments are parsed in a `template` context, which accepts any
//! content including table parts, and lifted out of the fragment root.

use domq_dom::{Attribute, Document, DomTree, ElementData, NodeData, NodeId, NodeOperations, TextData};
use html5ever::tendril::TendrilSink;
use html5ever::{QualName, local_name, ns, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use tracing::{debug, warn};

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes
    pub preserve_whitespace: bool,
    /// Keep the full document structure even for fragment input
    pub force_document: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: true,
            force_document: false,
        }
    }
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markup into a new Document; parsed nodes become children of
    /// the document node
    pub fn parse(&self, html: &str) -> Document {
        let mut document = Document::new();
        let tree = document.tree_mut();
        let root = tree.root();
        for node in self.parse_into(html, tree) {
            if let Err(err) = tree.append_child(root, node) {
                warn!(%err, "dropping parsed node");
            }
        }
        debug!(nodes = document.tree().len(), "parsed document");
        document
    }

    /// Parse markup into an existing tree, returning the top-level nodes
    /// detached and in source order
    pub fn parse_into(&self, html: &str, tree: &mut DomTree) -> Vec<NodeId> {
        let mut roots = Vec::new();
        if self.options.force_document || is_full_document(html) {
            let dom = parse_document(RcDom::default(), Default::default()).one(html);
            for child in dom.document.children.borrow().iter() {
                roots.extend(self.convert_node(child, tree));
            }
        } else {
            let context = QualName::new(None, ns!(html), local_name!("template"));
            let dom = parse_fragment(RcDom::default(), Default::default(), context, Vec::new(), false).one(html);
            // the fragment root is a synthetic `html` element
            for fragment_root in dom.document.children.borrow().iter() {
                for child in fragment_root.children.borrow().iter() {
                    roots.extend(self.convert_node(child, tree));
                }
            }
        }
        debug!(input_len = html.len(), roots = roots.len(), "parsed markup");
        roots
    }

    /// Convert an RcDom node (and its subtree) into a detached arena node
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
        let data = match &handle.data {
            RcNodeData::Document => return None,
            RcNodeData::Doctype { name, public_id, system_id } => NodeData::Doctype {
                name: name.to_string(),
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            },
            RcNodeData::Text { contents } => {
                let content = contents.borrow().to_string();
                if !self.options.preserve_whitespace && content.trim().is_empty() {
                    return None;
                }
                NodeData::Text(TextData { content })
            }
            RcNodeData::Comment { contents } => NodeData::Comment(contents.to_string()),
            RcNodeData::ProcessingInstruction { target, contents } => NodeData::ProcessingInstruction {
                target: target.to_string(),
                data: contents.to_string(),
            },
            RcNodeData::Element { name, attrs, .. } => {
                let mut elem = ElementData::new(&name.local);
                for attr in attrs.borrow().iter() {
                    let attr_name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    // Duplicate attributes never reach here; html5ever keeps the first
                    elem.attrs.push(Attribute { name: attr_name, value: attr.value.to_string() });
                }
                NodeData::Element(elem)
            }
        };

        let id = tree.create_node(data);
        for child in handle.children.borrow().iter() {
            if let Some(child_id) = self.convert_node(child, tree) {
                if let Err(err) = tree.append_child(id, child_id) {
                    warn!(%err, "dropping parsed node");
                }
            }
        }
        Some(id)
    }
}

/// Whether markup carries its own document structure
fn is_full_document(html: &str) -> bool {
    let head: String = html.trim_start()
        .chars()
        .take(10)
        .flat_map(char::to_lowercase)
        .collect();
    if head.starts_with("<!doctype") {
        return true;
    }
    ["html", "head", "body"].iter().any(|tag| {
        head.strip_prefix('<')
            .and_then(|rest| rest.strip_prefix(tag))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.get(id).map(|n| n.node_name().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_fragment_without_single_root() {
        let mut tree = DomTree::new();
        let roots = HtmlParser::new().parse_into("<a></a><p></p><b></b><a></a>", &mut tree);
        assert_eq!(tags(&tree, &roots), ["a", "p", "b", "a"]);
        assert!(roots.iter().all(|&id| tree.parent(id).is_none()));
    }

    #[test]
    fn test_fragment_keeps_text_and_whitespace() {
        let mut tree = DomTree::new();
        let roots = HtmlParser::new().parse_into("hello <b>x</b> ", &mut tree);
        assert_eq!(tags(&tree, &roots), ["#text", "b", "#text"]);

        let roots = HtmlParser::new().parse_into(" <b></b>", &mut tree);
        assert_eq!(tags(&tree, &roots), ["#text", "b"]);
    }

    #[test]
    fn test_fragment_keeps_table_parts() {
        let mut tree = DomTree::new();
        let roots = HtmlParser::new().parse_into("<td>x</td><td>y</td>", &mut tree);
        assert_eq!(tags(&tree, &roots), ["td", "td"]);

        let roots = HtmlParser::new().parse_into("<tr><td>a</td></tr>", &mut tree);
        assert_eq!(tags(&tree, &roots), ["tr"]);
        assert_eq!(tags(&tree, &tree.child_ids(roots[0])), ["td"]);
    }

    #[test]
    fn test_whitespace_dropped_when_disabled() {
        let parser = HtmlParser::with_options(ParseOptions {
            preserve_whitespace: false,
            ..Default::default()
        });
        let doc = parser.parse("<ul>\n  <li>a</li>\n</ul>");
        let tree = doc.tree();
        let ul = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.child_ids(ul).len(), 1);
    }

    #[test]
    fn test_full_document_detection() {
        assert!(is_full_document("  <!DOCTYPE html><p>"));
        assert!(is_full_document("<HTML lang=en>"));
        assert!(is_full_document("<body class=x>"));
        assert!(is_full_document("<head>"));
        assert!(!is_full_document("<header>"));
        assert!(!is_full_document("<bodyguard>"));
        assert!(!is_full_document("<div>"));
        assert!(!is_full_document(""));

        let doc = HtmlParser::new().parse("<!doctype html><title>T</title>");
        let tree = doc.tree();
        let top = tree.child_ids(tree.root());
        assert_eq!(tags(tree, &top), ["html", "html"]);
        assert!(matches!(tree.get(top[0]).unwrap().data, NodeData::Doctype { .. }));
    }

    #[test]
    fn test_attributes_in_source_order() {
        let doc = HtmlParser::new().parse(r#"<a href="/x" title="t" data-id="3"></a>"#);
        let tree = doc.tree();
        let a = tree.first_child(tree.root()).unwrap();
        let names: Vec<_> = tree.element(a).unwrap().attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["href", "title", "data-id"]);
    }
}
