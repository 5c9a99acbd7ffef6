//! Accessor layer: text, markup, attributes, properties, style, data and
//! classes
//!
//! Getters read the first element member and return `None` on a set
//! without elements. Setters apply to every member and return the set.

use domq_dom::{DataRecord, Document, ElementData, NodeData, NodeId, StyleMap};
use domq_html::{inner_html, outer_html};
use serde_json::Value;

use crate::node_set::NodeSet;
use crate::{Error, Result};

const DATA_PREFIX: &str = "data-";

impl NodeSet {
    fn read_first<R>(&self, read: impl FnOnce(&Document, NodeId) -> R) -> Result<Option<R>> {
        let members = self.live_members()?;
        let document = self.doc.borrow();
        let first = members.into_iter().find(|&id| document.tree().is_element(id));
        Ok(first.map(|id| read(&*document, id)))
    }

    fn read_each<R>(&self, read: impl Fn(&Document, NodeId) -> R) -> Result<Vec<R>> {
        let members = self.live_members()?;
        let document = self.doc.borrow();
        Ok(members.into_iter().map(|id| read(&*document, id)).collect())
    }

    fn update_elements(&self, mut update: impl FnMut(&mut Document, NodeId) -> Result<()>) -> Result<&Self> {
        let members = self.live_members()?;
        let mut document = self.doc.borrow_mut();
        for id in members {
            if document.tree().is_element(id) {
                update(&mut *document, id)?;
            }
        }
        Ok(self)
    }

    fn update_attrs(&self, mut update: impl FnMut(&mut ElementData)) -> Result<&Self> {
        self.update_elements(|document, id| {
            if let Some(element) = document.tree_mut().element_mut(id) {
                update(element);
            }
            Ok(())
        })
    }

    /// Text content of the first element member
    pub fn text(&self) -> Result<Option<String>> {
        self.read_first(|document, id| document.tree().text_content(id))
    }

    /// Text content of every member
    pub fn texts(&self) -> Result<Vec<String>> {
        self.read_each(|document, id| document.tree().text_content(id))
    }

    /// Replace the content of every member with `text`.
    ///
    /// Elements get a single text child; text and comment nodes change
    /// their value.
    pub fn set_text(&self, text: &str) -> Result<&Self> {
        let members = self.live_members()?;
        let mut document = self.doc.borrow_mut();
        for id in members {
            if document.tree().is_element(id) {
                document.set_text_content(id, text)?;
                continue;
            }
            match document.tree_mut().get_mut(id).map(|node| &mut node.data) {
                Some(NodeData::Text(data)) => data.content = text.to_string(),
                Some(NodeData::Comment(data)) => *data = text.to_string(),
                _ => {}
            }
        }
        Ok(self)
    }

    /// Inner markup of the first element member
    pub fn html(&self) -> Result<Option<String>> {
        self.read_first(|document, id| inner_html(document.tree(), id))
    }

    /// Inner markup of every member
    pub fn htmls(&self) -> Result<Vec<String>> {
        self.read_each(|document, id| inner_html(document.tree(), id))
    }

    /// Replace the children of every element member with parsed markup
    pub fn set_html(&self, markup: &str) -> Result<&Self> {
        self.update_elements(|document, id| Ok(document.clear_children(id)?))?;
        self.append(markup)
    }

    /// Outer markup of the first element member
    pub fn outer_html(&self) -> Result<Option<String>> {
        self.read_first(|document, id| outer_html(document.tree(), id))
    }

    pub fn tag_name(&self) -> Result<Option<String>> {
        Ok(self.read_first(|document, id| document.tree().tag_name(id).map(str::to_string))?.flatten())
    }

    /// Attribute of the first element member
    pub fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read_first(|document, id| {
            document.tree().element(id).and_then(|e| e.get_attr(name)).map(str::to_string)
        })?.flatten())
    }

    /// All attributes of the first element member, in source order
    pub fn attrs(&self) -> Result<Option<Vec<(String, String)>>> {
        Ok(self.read_first(|document, id| {
            document.tree().element(id).map(|e| {
                e.attrs.iter().map(|a| (a.name.clone(), a.value.clone())).collect()
            })
        })?.flatten())
    }

    pub fn set_attr(&self, name: &str, value: &str) -> Result<&Self> {
        self.update_attrs(|element| element.set_attr(name, value))
    }

    /// Remove the space-separated attribute `names` from every element
    pub fn remove_attr(&self, names: &str) -> Result<&Self> {
        self.update_attrs(|element| {
            for name in names.split_whitespace() {
                element.remove_attr(name);
            }
        })
    }

    /// DOM property of the first element member; unknown names read as
    /// `None`
    pub fn prop(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.read_first(|document, id| -> Option<Value> {
            let tree = document.tree();
            let node = tree.get(id)?;
            let element = node.as_element()?;
            let value = match name {
                "tagName" | "nodeName" => Value::from(node.node_name()),
                "nodeType" => Value::from(node.node_type().to_u32()),
                "textContent" | "nodeValue" => Value::from(tree.text_content(id)),
                "innerHTML" => Value::from(inner_html(tree, id)),
                "outerHTML" => Value::from(outer_html(tree, id)),
                "id" => Value::from(element.get_attr("id").unwrap_or_default()),
                "className" => Value::from(element.get_attr("class").unwrap_or_default()),
                "childElementCount" => Value::from(tree.element_children(id).len()),
                _ => return None,
            };
            Some(value)
        })?.flatten())
    }

    /// Set a writable DOM property on every member
    pub fn set_prop(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        let text = match value.into() {
            Value::String(s) => s,
            other => other.to_string(),
        };
        match name {
            "textContent" | "nodeValue" => self.set_text(&text),
            "innerHTML" => self.set_html(&text),
            "id" => self.set_attr("id", &text),
            "className" => self.set_attr("class", &text),
            _ => Err(Error::UnknownProperty(name.to_string())),
        }
    }

    /// Inline style property of the first element member
    pub fn css(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read_first(|document, id| {
            let style = document.tree().element(id).and_then(|e| e.get_attr("style")).unwrap_or_default();
            StyleMap::parse(style).get(name).map(str::to_string)
        })?.flatten())
    }

    /// Set an inline style property; the whole `style` attribute is
    /// rewritten
    pub fn set_css(&self, name: &str, value: &str) -> Result<&Self> {
        self.update_attrs(|element| {
            let mut style = StyleMap::parse(element.get_attr("style").unwrap_or_default());
            style.set(name, value);
            element.set_attr("style", &style.to_string());
        })
    }

    /// Stored value for `key`, else the `data-<key>` attribute
    pub fn data(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_first(|document, id| -> Option<Value> {
            if let Some(value) = document.data().get_value(id, key) {
                return Some(value.clone());
            }
            document.tree()
                .element(id)
                .and_then(|e| e.get_attr(&format!("{DATA_PREFIX}{key}")))
                .map(decode_data_attr)
        })?.flatten())
    }

    /// Stored record, or the `data-*` attributes when nothing is stored
    pub fn data_all(&self) -> Result<Option<DataRecord>> {
        self.read_first(|document, id| -> DataRecord {
            if let Some(record) = document.data().get(id).filter(|r| !r.is_empty()) {
                return record.clone();
            }
            document.tree()
                .element(id)
                .map(|e| {
                    e.attrs.iter()
                        .filter_map(|a| {
                            let key = a.name.strip_prefix(DATA_PREFIX)?;
                            Some((key.to_string(), decode_data_attr(&a.value)))
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub fn set_data(&self, key: &str, value: impl Into<Value>) -> Result<&Self> {
        let value = value.into();
        self.update_elements(|document, id| {
            document.data_mut().set(id, key, value.clone());
            Ok(())
        })
    }

    /// Remove the space-separated `names` from the stored data of every
    /// element; `None` removes the whole record
    pub fn remove_data(&self, names: Option<&str>) -> Result<&Self> {
        self.update_elements(|document, id| {
            match names {
                None => {
                    document.data_mut().remove(id, None);
                }
                Some(names) => {
                    for name in names.split_whitespace() {
                        document.data_mut().remove(id, Some(name));
                    }
                }
            }
            Ok(())
        })
    }

    /// Whether any element member carries the class token
    pub fn has_class(&self, class: &str) -> Result<bool> {
        let members = self.live_members()?;
        let document = self.doc.borrow();
        Ok(members.into_iter()
            .filter_map(|id| document.tree().element(id))
            .any(|e| e.has_class(class)))
    }

    /// Add the space-separated class tokens to every element
    pub fn add_class(&self, names: &str) -> Result<&Self> {
        self.update_attrs(|element| {
            let mut classes = element.class_list();
            if classes.add(names.split_whitespace()) {
                element.set_attr("class", &classes.value());
            }
        })
    }

    /// Remove the space-separated class tokens; an empty string removes
    /// every class
    pub fn remove_class(&self, names: &str) -> Result<&Self> {
        self.update_attrs(|element| {
            if !element.has_attr("class") {
                return;
            }
            let mut classes = element.class_list();
            if names.trim().is_empty() {
                classes.clear();
            } else if !classes.remove(names.split_whitespace()) {
                return;
            }
            element.set_attr("class", &classes.value());
        })
    }

    /// Toggle each space-separated class token on every element
    pub fn toggle_class(&self, names: &str) -> Result<&Self> {
        if names.trim().is_empty() {
            return Ok(self);
        }
        self.update_attrs(|element| {
            let mut classes = element.class_list();
            for name in names.split_whitespace() {
                classes.toggle(name);
            }
            element.set_attr("class", &classes.value());
        })
    }
}

/// `data-*` attribute value: JSON objects are decoded, anything else stays
/// a string
fn decode_data_attr(raw: &str) -> Value {
    if raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }
    Value::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_data_attr() {
        assert_eq!(decode_data_attr("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(decode_data_attr("{broken"), json!("{broken"));
        assert_eq!(decode_data_attr("[1,2]"), json!("[1,2]"));
    }

    #[test]
    fn test_getters_skip_leading_text() {
        let set = NodeSet::parse("hello<b class=\"x\">bold</b>");
        assert_eq!(set.text().unwrap().as_deref(), Some("bold"));
        assert_eq!(set.tag_name().unwrap().as_deref(), Some("b"));
        assert_eq!(set.texts().unwrap(), vec!["hello", "bold"]);
    }

    #[test]
    fn test_set_text_on_text_member() {
        let set = NodeSet::parse("<p>a<b>b</b></p>");
        set.find("p").unwrap().contents().unwrap().first().set_text("z").unwrap();
        assert_eq!(set.to_string(), "<p>z<b>b</b></p>");
    }

    #[test]
    fn test_remove_class_all() {
        let set = NodeSet::parse("<p class=\"a b\"></p><i></i>");
        set.remove_class("").unwrap();
        assert_eq!(set.to_string(), "<p class=\"\"></p><i></i>");
    }
}
