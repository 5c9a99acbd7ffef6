//! Inline style map
//!
//! Parses and rewrites `style` attribute values. Statements are separated
//! by `;` and keyed by the text before the first `:`.

/// Ordered map of style properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value.
    ///
    /// Whitespace runs collapse to one space; keys and values are trimmed.
    /// A statement without a key (no `:` or `:` first) is skipped. When a
    /// key repeats, the last value wins and the first position is kept.
    pub fn parse(css: &str) -> Self {
        let collapsed = css.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut map = Self::new();
        for statement in collapsed.split(';') {
            match statement.find(':') {
                Some(pos) if pos > 0 => {
                    let key = statement[..pos].trim();
                    let value = statement[pos + 1..].trim();
                    map.set(key, value);
                }
                _ => {}
            }
        }
        map
    }

    /// Property value, case-sensitive key match
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing an existing value in place
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Serializes as `key: value;` statements with no separator
impl std::fmt::Display for StyleMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.entries {
            write!(f, "{key}: {value};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collapses_and_trims() {
        let style = StyleMap::parse("color :  red;\n  width:10px ; bogus; :x");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("width"), Some("10px"));
        assert_eq!(style.get("Color"), None);
    }

    #[test]
    fn test_last_duplicate_wins_in_first_position() {
        let style = StyleMap::parse("a: 1; b: 2; a: 3");
        assert_eq!(style.to_string(), "a: 3;b: 2;");
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let style = StyleMap::parse("background: url(http://x/y.png)");
        assert_eq!(style.get("background"), Some("url(http://x/y.png)"));
    }

    #[test]
    fn test_set_and_remove() {
        let mut style = StyleMap::new();
        style.set("color", "red");
        style.set("color", "blue");
        assert_eq!(style.to_string(), "color: blue;");
        assert_eq!(style.remove("color").as_deref(), Some("blue"));
        assert!(style.is_empty());
    }
}
