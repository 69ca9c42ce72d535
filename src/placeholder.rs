//! Named regex fragments usable as `(:name)` / `{name}` tokens in route patterns.

use std::collections::HashMap;

/// Built-in placeholders available to every collection.
pub const DEFAULT_PLACEHOLDERS: [(&str, &str); 7] = [
    ("any", ".*"),
    ("segment", "[^/]+"),
    ("alphanum", "[a-zA-Z0-9]+"),
    ("num", "[0-9]+"),
    ("alpha", "[a-zA-Z]+"),
    ("hash", "[^/]+"),
    ("slug", "[a-zA-Z0-9-]+"),
];

/// Mapping of placeholder name to regex fragment (no anchors, no parentheses).
///
/// Owned by a single [`RouteCollection`](crate::collection::RouteCollection).
/// Fragments are expanded when a route is registered, so later additions never
/// change patterns that were compiled earlier.
#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    entries: HashMap<String, String>,
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        let entries = DEFAULT_PLACEHOLDERS
            .iter()
            .map(|(name, regex)| ((*name).to_string(), (*regex).to_string()))
            .collect();
        Self { entries }
    }
}

impl PlaceholderTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placeholder, overwriting an existing one with the same name.
    pub fn add(&mut self, name: impl Into<String>, regex: impl Into<String>) {
        self.entries.insert(name.into(), regex.into());
    }

    /// Merge several placeholders at once.
    pub fn extend<I, K, V>(&mut self, placeholders: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, regex) in placeholders {
            self.add(name, regex);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_present() {
        let table = PlaceholderTable::new();
        assert_eq!(table.get("num"), Some("[0-9]+"));
        assert_eq!(table.get("any"), Some(".*"));
        assert_eq!(table.get("slug"), Some("[a-zA-Z0-9-]+"));
        assert_eq!(table.len(), DEFAULT_PLACEHOLDERS.len());
    }

    #[test]
    fn add_overwrites() {
        let mut table = PlaceholderTable::new();
        table.add("num", "[1-9][0-9]*");
        table.add("uuid", "[0-9a-f-]{36}");
        assert_eq!(table.get("num"), Some("[1-9][0-9]*"));
        assert!(table.contains("uuid"));
    }
}
