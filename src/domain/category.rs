use serde::{Deserialize, Serialize};

/// Categories offered when no set is configured.
pub const DEFAULT_CATEGORIES: &[&str] = &["Food", "Transport", "Shopping", "Bills", "Other"];

/// The configured set of expense categories.
///
/// An empty set accepts any non-empty category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Vec<String> = Vec::new();
        for name in names {
            let name: String = name.into();
            let name = name.trim().to_string();
            if name.is_empty() || set.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                continue;
            }
            set.push(name);
        }
        Self { names: set }
    }

    /// A set that accepts any non-empty category.
    pub fn unrestricted() -> Self {
        Self { names: Vec::new() }
    }

    /// Parse a comma-separated list, e.g. "Food,Travel,Bills".
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_unrestricted(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve user input to the canonical spelling of a category.
    /// Returns `None` for empty input or a category outside the set.
    pub fn resolve(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if self.is_unrestricted() {
            return Some(input.to_string());
        }
        self.names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(input))
            .cloned()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let set = CategorySet::default();
        assert_eq!(set.resolve("food"), Some("Food".to_string()));
        assert_eq!(set.resolve("  BILLS "), Some("Bills".to_string()));
    }

    #[test]
    fn test_resolve_rejects_unknown_and_empty() {
        let set = CategorySet::default();
        assert_eq!(set.resolve("Yachts"), None);
        assert_eq!(set.resolve("   "), None);
    }

    #[test]
    fn test_unrestricted_accepts_anything_non_empty() {
        let set = CategorySet::unrestricted();
        assert_eq!(set.resolve("Yachts"), Some("Yachts".to_string()));
        assert_eq!(set.resolve(""), None);
    }

    #[test]
    fn test_parse_list_drops_blanks_and_duplicates() {
        let set = CategorySet::parse_list("Food, Travel,,food ,Bills");
        assert_eq!(set.names(), &["Food", "Travel", "Bills"]);
    }
}
