//! Ingredient-to-aisle category lookup.
//!
//! # Invariants
//! - Keys are stored normalized (trimmed, lower-cased).
//! - Lookup order: full normalized name, then each whitespace token in the
//!   order it appears; first hit wins.
//! - A miss yields `default_category`.
//! - A dictionary value is an immutable snapshot for one planning run.

use crate::model::ingredient::normalize_name;
use std::collections::HashMap;

/// Category returned when no dictionary entry matches.
pub const DEFAULT_CATEGORY: &str = "Divers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDictionary {
    entries: HashMap<String, String>,
    default_category: String,
}

impl Default for CategoryDictionary {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY)
    }
}

impl CategoryDictionary {
    pub fn new(default_category: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default_category: default_category.into(),
        }
    }

    /// Builds a snapshot from raw `(ingredient, category)` pairs.
    ///
    /// Later pairs override earlier ones with the same normalized key.
    pub fn from_entries<I, K, V>(entries: I, default_category: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dictionary = Self::new(default_category);
        for (ingredient, category) in entries {
            dictionary.insert(ingredient.as_ref(), category);
        }
        dictionary
    }

    pub fn insert(&mut self, ingredient: &str, category: impl Into<String>) {
        let key = normalize_name(ingredient);
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, category.into());
    }

    pub fn remove(&mut self, ingredient: &str) -> Option<String> {
        self.entries.remove(&normalize_name(ingredient))
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries = self
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect::<Vec<_>>();
        entries.sort_unstable();
        entries
    }

    pub fn category_for(&self, ingredient_name: &str) -> &str {
        let normalized = normalize_name(ingredient_name);
        if let Some(category) = self.entries.get(&normalized) {
            return category;
        }
        normalized
            .split_whitespace()
            .find_map(|token| self.entries.get(token))
            .map_or(self.default_category.as_str(), String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryDictionary, DEFAULT_CATEGORY};

    fn dictionary() -> CategoryDictionary {
        CategoryDictionary::from_entries(
            [
                ("Tomato", "Fruits et légumes"),
                ("olive oil", "Épicerie"),
                ("oil", "Huiles"),
                ("cheese", "Crèmerie"),
                ("goat", "Boucherie"),
            ],
            DEFAULT_CATEGORY,
        )
    }

    #[test]
    fn full_name_match_is_case_insensitive() {
        assert_eq!(dictionary().category_for("  TOMATO "), "Fruits et légumes");
    }

    #[test]
    fn full_name_wins_over_tokens() {
        assert_eq!(dictionary().category_for("Olive Oil"), "Épicerie");
        assert_eq!(dictionary().category_for("sunflower oil"), "Huiles");
    }

    #[test]
    fn first_token_in_name_order_wins() {
        assert_eq!(dictionary().category_for("goat cheese"), "Boucherie");
        assert_eq!(dictionary().category_for("cheese goat"), "Crèmerie");
    }

    #[test]
    fn unmatched_name_uses_default() {
        assert_eq!(dictionary().category_for("saffron"), DEFAULT_CATEGORY);
        let custom = CategoryDictionary::new("Other");
        assert_eq!(custom.category_for("saffron"), "Other");
    }

    #[test]
    fn insert_and_remove_normalize_keys() {
        let mut dictionary = CategoryDictionary::default();
        dictionary.insert(" Milk ", "Crèmerie");
        dictionary.insert("   ", "ignored");
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.entries(), vec![("milk", "Crèmerie")]);
        assert_eq!(dictionary.remove("MILK").as_deref(), Some("Crèmerie"));
        assert!(dictionary.is_empty());
    }
}
