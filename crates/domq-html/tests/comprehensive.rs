//! Comprehensive tests for domq-html
//!
//! Parse then serialize through the public API.

use domq_html::{inner_html, outer_html, parse, HtmlParser, ParseOptions};

#[test]
fn test_parse_empty() {
    let doc = parse("");
    assert_eq!(doc.tree().len(), 1, "Empty input leaves only the document node");
}

#[test]
fn test_fragment_round_trip() {
    let html = r#"<div><a title="hello">Some text</a><a>B</a><span>C</span></div>"#;
    let doc = parse(html);
    assert_eq!(outer_html(doc.tree(), doc.tree().root()), html);
}

#[test]
fn test_multiple_roots_round_trip() {
    let html = "<a></a><p></p><b></b><a></a>";
    let doc = parse(html);
    let tree = doc.tree();
    assert_eq!(tree.child_ids(tree.root()).len(), 4);
    assert_eq!(inner_html(tree, tree.root()), html);
}

#[test]
fn test_whitespace_preserved_by_default() {
    let html = "<p> <a>M<i>A</i></a> <span></span></p>";
    let doc = parse(html);
    assert_eq!(outer_html(doc.tree(), doc.tree().root()), html);
}

#[test]
fn test_entities_decoded_and_reescaped() {
    let doc = parse("<p title=\"a&amp;b\">1 &lt; 2 &amp;&amp; 3</p>");
    let tree = doc.tree();
    let p = tree.first_child(tree.root()).unwrap();
    assert_eq!(tree.element(p).unwrap().get_attr("title"), Some("a&b"));
    assert_eq!(tree.text_content(p), "1 < 2 && 3");
    assert_eq!(inner_html(tree, p), "1 &lt; 2 &amp;&amp; 3");
}

#[test]
fn test_malformed_markup_recovers() {
    let doc = parse("<div><p>one<p>two</div>");
    let tree = doc.tree();
    let div = tree.first_child(tree.root()).unwrap();
    assert_eq!(inner_html(tree, div), "<p>one</p><p>two</p>");
}

#[test]
fn test_full_document_kept() {
    let html = "<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>";
    let doc = parse(html);
    assert_eq!(outer_html(doc.tree(), doc.tree().root()), html);
}

#[test]
fn test_force_document_option() {
    let parser = HtmlParser::with_options(ParseOptions {
        force_document: true,
        ..ParseOptions::default()
    });
    let doc = parser.parse("<p>x</p>");
    assert_eq!(
        outer_html(doc.tree(), doc.tree().root()),
        "<html><head></head><body><p>x</p></body></html>"
    );
}

#[test]
fn test_comments_kept() {
    let html = "<!-- note --><b>x</b>";
    let doc = parse(html);
    assert_eq!(inner_html(doc.tree(), doc.tree().root()), html);
}

#[test]
fn test_table_fragments_keep_their_tags() {
    let doc = parse("<tr><td>a</td></tr>");
    assert_eq!(inner_html(doc.tree(), doc.tree().root()), "<tr><td>a</td></tr>");

    let doc = parse("<tbody><tr><td>a</td><td>b</td></tr></tbody>");
    assert_eq!(inner_html(doc.tree(), doc.tree().root()), "<tbody><tr><td>a</td><td>b</td></tr></tbody>");
}

#[test]
fn test_leading_whitespace_preserved() {
    let doc = parse(" <b></b>");
    let tree = doc.tree();
    assert_eq!(tree.child_ids(tree.root()).len(), 2);
    assert_eq!(inner_html(tree, tree.root()), " <b></b>");
}

#[test]
fn test_body_wrapper_kept_as_document() {
    let doc = parse("<body><p>x</p></body>");
    assert_eq!(
        outer_html(doc.tree(), doc.tree().root()),
        "<html><head></head><body><p>x</p></body></html>"
    );
}
