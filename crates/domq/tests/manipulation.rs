//! Manipulation tests - insertion, wrapping, replacement and removal
//!
//! Every test parses markup, mutates through the node-set API and checks
//! the serialized document.

use domq::{Error, NodeSet};

// ============================================================================
// REMOVAL
// ============================================================================

#[test]
fn test_remove_links() -> domq::Result<()> {
    let doc = NodeSet::parse(r#"<div><a title="hello">Some text</a><a>B</a><span>C</span></div>"#);
    let mut links = doc.find("a")?;
    links.remove()?;
    assert!(links.is_empty());
    assert_eq!(doc.to_string(), "<div><span>C</span></div>");
    Ok(())
}

#[test]
fn test_remove_matching_filter() -> domq::Result<()> {
    let doc = NodeSet::parse(r#"<div><a title="hello">Some text</a><a>B</a><span>C</span></div>"#);
    let mut links = doc.find("a")?;
    let removed = links.remove_matching("[title]")?;
    assert!(removed.is_empty());
    assert_eq!(links.len(), 1);
    assert_eq!(links.text()?.as_deref(), Some("B"));
    assert_eq!(doc.to_string(), "<div><a>B</a><span>C</span></div>");
    Ok(())
}

#[test]
fn test_empty_is_remove() -> domq::Result<()> {
    let doc = NodeSet::parse("<ul><li>1</li><li>2</li></ul>");
    let mut items = doc.find("li")?;
    items.empty()?;
    assert!(items.is_empty());
    assert_eq!(doc.to_string(), "<ul></ul>");
    Ok(())
}

#[test]
fn test_removed_nodes_are_stale() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><p>x</p></div>");
    let kept = doc.find("p")?;
    doc.find("p")?.remove()?;
    assert!(matches!(kept.text(), Err(Error::StaleNode(_))));
    assert!(matches!(kept.append("<i></i>"), Err(Error::StaleNode(_))));
    Ok(())
}

#[test]
fn test_remove_whole_document() -> domq::Result<()> {
    let mut doc = NodeSet::parse("<a></a><b></b>");
    let root = doc.document();
    doc.remove()?;
    assert!(doc.is_empty());
    assert_eq!(root.to_string(), "");
    Ok(())
}

// ============================================================================
// TEXT AND MARKUP SETTERS
// ============================================================================

#[test]
fn test_change_text_of_every_member() -> domq::Result<()> {
    let doc = NodeSet::parse("<p><a>1</a><a>2</a></p>");
    doc.find("a")?.set_text("x")?;
    assert_eq!(doc.to_string(), "<p><a>x</a><a>x</a></p>");
    Ok(())
}

#[test]
fn test_set_text_escapes_markup() -> domq::Result<()> {
    let doc = NodeSet::parse("<p><b>old</b></p>");
    let p = doc.find("p")?;
    p.set_text("<i>&</i>")?;
    assert_eq!(p.text()?.as_deref(), Some("<i>&</i>"));
    assert_eq!(doc.to_string(), "<p>&lt;i&gt;&amp;&lt;/i&gt;</p>");
    Ok(())
}

#[test]
fn test_set_html() -> domq::Result<()> {
    let doc = NodeSet::parse("<p> <a>M<i>A</i></a> <span></span> </p>");
    doc.find("a")?.set_html("<i>x</i>")?;
    assert_eq!(doc.to_string(), "<p> <a><i>x</i></a> <span></span> </p>");
    assert_eq!(doc.find("a")?.html()?.as_deref(), Some("<i>x</i>"));
    Ok(())
}

// ============================================================================
// APPEND / PREPEND
// ============================================================================

#[test]
fn test_append_to_every_match() -> domq::Result<()> {
    let doc = NodeSet::parse("<a></a><p></p><b></b><a></a>");
    doc.find("a")?.append("<span></span>")?;
    assert_eq!(doc.to_string(), "<a><span></span></a><p></p><b></b><a><span></span></a>");
    Ok(())
}

#[test]
fn test_append_node_set_from_other_document() -> domq::Result<()> {
    let doc = NodeSet::parse("<a>X</a>");
    let other = NodeSet::parse("<i>y</i>");
    doc.find("a")?.append(&other)?;
    assert_eq!(doc.to_string(), "<a>X<i>y</i></a>");
    // imported copies; the source stays where it was
    assert_eq!(other.to_string(), "<i>y</i>");
    assert_eq!(other.find("i")?.text()?.as_deref(), Some("y"));
    Ok(())
}

#[test]
fn test_append_same_document_clones() -> domq::Result<()> {
    let doc = NodeSet::parse("<div></div><div></div><b>!</b>");
    let bang = doc.find("b")?;
    doc.find("div")?.append(&bang)?;
    assert_eq!(doc.to_string(), "<div><b>!</b></div><div><b>!</b></div><b>!</b>");
    Ok(())
}

#[test]
fn test_prepend_reverses_items() -> domq::Result<()> {
    let doc = NodeSet::parse("<a>X</a>");
    doc.find("a")?.prepend(["<span></span>", "<i></i>"])?;
    assert_eq!(doc.to_string(), "<a><i></i><span></span>X</a>");
    Ok(())
}

#[test]
fn test_append_multiple_items_keep_order() -> domq::Result<()> {
    let doc = NodeSet::parse("<a>X</a>");
    doc.find("a")?.append(["<span></span>", "<i></i>"])?;
    assert_eq!(doc.to_string(), "<a>X<span></span><i></i></a>");
    Ok(())
}

#[test]
fn test_append_plain_text() -> domq::Result<()> {
    let doc = NodeSet::parse("<p>a</p>");
    doc.find("p")?.append("+b")?;
    assert_eq!(doc.find("p")?.text()?.as_deref(), Some("a+b"));
    assert_eq!(doc.to_string(), "<p>a+b</p>");
    Ok(())
}

#[test]
fn test_append_text_with_leading_space() -> domq::Result<()> {
    let doc = NodeSet::parse("<p>a</p><div></div>");
    doc.find("p")?.append(" & b")?;
    doc.find("div")?.append(" <b></b>")?;
    assert_eq!(doc.find("p")?.text()?.as_deref(), Some("a & b"));
    assert_eq!(doc.to_string(), "<p>a &amp; b</p><div> <b></b></div>");
    Ok(())
}

#[test]
fn test_append_cell_to_row() -> domq::Result<()> {
    let doc = NodeSet::parse("<table><tbody><tr><td>a</td></tr></tbody></table>");
    doc.find("tr")?.append("<td>x</td>")?;
    assert_eq!(doc.find("td")?.len(), 2);
    assert_eq!(doc.to_string(), "<table><tbody><tr><td>a</td><td>x</td></tr></tbody></table>");
    Ok(())
}

#[test]
fn test_parse_table_row_fragment() -> domq::Result<()> {
    let row = NodeSet::parse("<tr><td>a</td></tr>");
    assert_eq!(row.tag_name()?.as_deref(), Some("tr"));
    assert_eq!(row.find("td")?.len(), 1);
    assert_eq!(row.to_string(), "<tr><td>a</td></tr>");
    Ok(())
}

#[test]
fn test_append_to_moves_into_target() -> domq::Result<()> {
    let doc = NodeSet::parse(r#"<div class="container"><div id="el1"></div></div>"#);
    let mut incoming = NodeSet::parse(r#"<div id="el2"></div>"#);
    let inserted = incoming.append_to(doc.find("#el1")?)?;
    assert_eq!(doc.to_string(), r#"<div class="container"><div id="el1"><div id="el2"></div></div></div>"#);
    assert_eq!(inserted.attr("id")?.as_deref(), Some("el2"));
    assert_eq!(inserted.parent()?.attr("id")?.as_deref(), Some("el1"));
    assert!(incoming.is_empty());
    Ok(())
}

#[test]
fn test_append_to_selector_in_same_document() -> domq::Result<()> {
    let doc = NodeSet::parse(r#"<div id="box"></div><a>1</a><a>2</a>"#);
    let mut links = doc.find("a")?;
    let moved = links.append_to("#box")?;
    assert_eq!(moved.len(), 2);
    assert_eq!(doc.to_string(), r#"<div id="box"><a>1</a><a>2</a></div>"#);
    Ok(())
}

#[test]
fn test_prepend_to() -> domq::Result<()> {
    let doc = NodeSet::parse(r#"<div class="container"><div id="el1"><div id="el2"></div></div></div>"#);
    let mut incoming = NodeSet::parse("<a></a><b></b>");
    let inserted = incoming.prepend_to(doc.find("#el1")?)?;
    assert_eq!(inserted.len(), 2);
    assert_eq!(
        doc.to_string(),
        r#"<div class="container"><div id="el1"><b></b><a></a><div id="el2"></div></div></div>"#
    );
    Ok(())
}

// ============================================================================
// BEFORE / AFTER
// ============================================================================

#[test]
fn test_before_keeps_whitespace() -> domq::Result<()> {
    let doc = NodeSet::parse("<div> <a>X</a> </div>");
    doc.find("a")?.before("<span></span>")?;
    assert_eq!(doc.to_string(), "<div> <span></span><a>X</a> </div>");
    Ok(())
}

#[test]
fn test_after_keeps_whitespace() -> domq::Result<()> {
    let doc = NodeSet::parse("<div> <a>X</a> </div>");
    doc.find("a")?.after("<span></span>")?;
    assert_eq!(doc.to_string(), "<div> <a>X</a><span></span> </div>");
    Ok(())
}

#[test]
fn test_after_last_child_appends() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><a></a></div>");
    doc.find("a")?.after("<b></b>")?.before("<i></i>")?;
    assert_eq!(doc.to_string(), "<div><i></i><a></a><b></b></div>");
    Ok(())
}

#[test]
fn test_before_root_level_fails() {
    let doc = NodeSet::parse("<p></p>");
    let err = doc.children().unwrap().before("<i></i>").unwrap_err();
    assert!(matches!(err, Error::InvalidStructure { operation: "before", ref tag } if tag == "p"));
    assert_eq!(doc.to_string(), "<p></p>");
}

#[test]
fn test_before_detached_node_is_stale() -> domq::Result<()> {
    let doc = NodeSet::parse("<p></p>");
    let copy = doc.find("p")?.clone_nodes()?;
    assert!(matches!(copy.after("<i></i>"), Err(Error::StaleNode(_))));
    Ok(())
}

// ============================================================================
// REPLACE
// ============================================================================

#[test]
fn test_replace_with_markup() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><a>1</a><b>2</b></div>");
    let removed = doc.find("a")?.replace_with("<i>x</i>")?;
    assert_eq!(doc.to_string(), "<div><i>x</i><b>2</b></div>");
    // detached but still usable
    assert_eq!(removed.to_string(), "<a>1</a>");
    assert!(removed.parent()?.is_empty());
    Ok(())
}

#[test]
fn test_replace_with_moves_node_set() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><a>1</a><b>2</b></div>");
    doc.find("a")?.replace_with(doc.find("b")?)?;
    assert_eq!(doc.to_string(), "<div><b>2</b></div>");
    Ok(())
}

#[test]
fn test_replaced_nodes_reusable_as_content() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><a>1</a></div><section></section>");
    let removed = doc.find("a")?.replace_with("<hr>")?;
    doc.find("section")?.append(&removed)?;
    assert_eq!(doc.to_string(), "<div><hr></div><section><a>1</a></section>");
    Ok(())
}

// ============================================================================
// WRAPPING
// ============================================================================

#[test]
fn test_wrap_each_member() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><span>a</span><span>b</span></div>");
    doc.find("span")?.wrap("<b><i></i></b>")?;
    assert_eq!(doc.to_string(), "<div><b><i><span>a</span></i></b><b><i><span>b</span></i></b></div>");
    Ok(())
}

#[test]
fn test_wrap_root_level_fails() {
    let doc = NodeSet::parse("<div><p>x</p></div>");
    let top = doc.children().unwrap();
    assert!(matches!(top.wrap("<section></section>"), Err(Error::InvalidStructure { operation: "wrap", .. })));
    assert!(matches!(top.wrap_all("<section></section>"), Err(Error::InvalidStructure { operation: "wrap_all", .. })));
    assert_eq!(doc.to_string(), "<div><p>x</p></div>");
}

#[test]
fn test_wrap_all_collects_members() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><a></a><hr><a></a></div>");
    doc.find("a")?.wrap_all("<p></p>")?;
    assert_eq!(doc.to_string(), "<div><p><a></a><a></a></p><hr></div>");
    Ok(())
}

#[test]
fn test_wrap_inner() -> domq::Result<()> {
    let doc = NodeSet::parse("<ul><li>a</li><li>b<em>c</em></li></ul>");
    doc.find("li")?.wrap_inner("<span></span>")?;
    assert_eq!(doc.to_string(), "<ul><li><span>a</span></li><li><span>b<em>c</em></span></li></ul>");
    Ok(())
}

#[test]
fn test_wrap_errors_are_not_rolled_back() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><span></span></div><p></p>");
    let targets = doc.find("span")?.add("p")?;
    assert_eq!(targets.len(), 2);
    assert!(targets.wrap("<b></b>").is_err());
    assert_eq!(doc.to_string(), "<div><b><span></span></b></div><p></p>");
    Ok(())
}

#[test]
fn test_unwrap_keeps_children_in_place() -> domq::Result<()> {
    let doc = NodeSet::parse("<div><p><b>1</b>2</p><i></i></div>");
    let parents = doc.find("p")?.unwrap()?;
    assert_eq!(doc.to_string(), "<div><b>1</b>2<i></i></div>");
    assert_eq!(parents.tag_name()?.as_deref(), Some("div"));
    Ok(())
}

#[test]
fn test_unwrap_root_level_is_noop() -> domq::Result<()> {
    let doc = NodeSet::parse("<p><b></b></p>");
    let top = doc.children()?;
    let same = top.unwrap()?;
    assert_eq!(same, top);
    assert_eq!(doc.to_string(), "<p><b></b></p>");
    Ok(())
}

// ============================================================================
// EMPTY SETS
// ============================================================================

#[test]
fn test_mutations_on_empty_set_are_noops() -> domq::Result<()> {
    let doc = NodeSet::parse("<div></div>");
    let none = doc.find("a")?;
    none.append("<b></b>")?.before("<b></b>")?.wrap("<b></b>")?.set_text("x")?;
    assert!(none.replace_with("<b></b>")?.is_empty());
    assert_eq!(doc.to_string(), "<div></div>");
    Ok(())
}
