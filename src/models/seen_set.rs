use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of product ids already notified on for one site.
///
/// Persisted as JSON under the data directory. Only ever grows: ids are
/// unioned in after a successful run, never removed when a listing
/// disappears upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenSet {
    pub ids: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenSet {
    pub fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Union the given ids into the set and refresh the timestamp.
    pub fn absorb<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.ids.extend(ids);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let set = SeenSet::new();
        assert!(set.is_empty());
        assert!(!set.contains("https://x.com/products/cd"));
    }

    #[test]
    fn test_absorb_unions_and_bumps_timestamp() {
        let mut set = SeenSet::new();
        let before = set.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(1));
        set.absorb(vec!["a".to_string(), "b".to_string()]);
        set.absorb(vec!["b".to_string(), "c".to_string()]);

        assert_eq!(set.len(), 3);
        assert!(set.contains("a") && set.contains("b") && set.contains("c"));
        assert!(set.updated_at > before);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut set = SeenSet::new();
        set.absorb(vec!["a".to_string(), "b".to_string()]);

        let json = serde_json::to_string_pretty(&set).unwrap();
        let back: SeenSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set.ids, back.ids);
    }
}
