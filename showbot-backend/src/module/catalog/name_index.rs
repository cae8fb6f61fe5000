use std::collections::HashMap;

use crate::module::text::normalize_name;

/// Normalized player name → card uuids, in insertion order.
///
/// One player usually has several cards (different series, live and
/// legend versions), so every key maps to a list.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: HashMap<String, Vec<String>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, uuid: &str) {
        self.entries
            .entry(normalize_name(name))
            .or_default()
            .push(uuid.to_string());
    }

    /// Uuids filed under `name`; the query is normalized first.
    pub fn get(&self, name: &str) -> &[String] {
        self.entries
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct normalized names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_keep_order() {
        let mut index = NameIndex::new();
        index.insert("Mike Trout", "a");
        index.insert("Shohei Ohtani", "b");
        index.insert("MIKE TROUT", "c");

        assert_eq!(index.get("mike trout"), ["a", "c"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_accent_insensitive_keys() {
        let mut index = NameIndex::new();
        index.insert("Yoán Moncada", "y1");

        assert_eq!(index.get("yoan moncada"), ["y1"]);
        assert_eq!(index.get("YOÁN MONCADA"), ["y1"]);
        assert!(index.get("moncada").is_empty());
    }
}
