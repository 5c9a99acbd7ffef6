//! Token list (classList)
//!
//! Space-separated token set backing `class` attribute manipulation.
//! Matching is exact; no substring or case folding.

/// Ordered, de-duplicated list of whitespace-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<String>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        list.add(s.split_whitespace());
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add tokens not yet present; returns whether anything changed
    pub fn add<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) -> bool {
        let before = self.tokens.len();
        for token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
        self.tokens.len() != before
    }

    /// Remove every instance of the given tokens; returns whether anything changed
    pub fn remove<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) -> bool {
        let before = self.tokens.len();
        for token in tokens {
            self.tokens.retain(|t| t != token);
        }
        self.tokens.len() != before
    }

    /// Toggle a token, returns the new state
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.contains(token) {
            self.remove([token]);
            false
        } else {
            self.add([token]);
            true
        }
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Serialized value, tokens joined by single spaces
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl std::fmt::Display for TokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value())
    }
}
