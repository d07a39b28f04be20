//! Recently searched cities: a bounded, case-insensitive, most-recent-first
//! list persisted under the `quickCities` key.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::HISTORY_CAPACITY;

const CAPACITY: NonZeroUsize = match NonZeroUsize::new(HISTORY_CAPACITY) {
    Some(n) => n,
    None => unreachable!(),
};

/// The search history. Keys are lowercased names; the stored value keeps
/// the display casing of the first recording, which survives re-records of
/// the same city in different casing.
pub struct SearchHistory {
    entries: LruCache<String, String>,
}

impl fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(_, name)| name))
            .finish()
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self {
            entries: LruCache::new(CAPACITY),
        }
    }
}

impl SearchHistory {
    /// Records a resolved location name. A name equal to an existing entry
    /// up to case moves that entry to the front; otherwise the name is
    /// prepended and the oldest entry beyond capacity is evicted. Empty or
    /// whitespace-only names are ignored. Returns whether anything changed.
    pub fn record(&mut self, name: &str) -> bool {
        let display = name.trim();
        if display.is_empty() {
            return false;
        }
        let key = display.to_lowercase();
        if self.entries.get(&key).is_none() {
            self.entries.put(key, display.to_string());
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Display names, most recent first. This is also the persisted shape.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Rebuilds from a persisted JSON array. Anything that is not an array
    /// of strings is an error; callers recover to an empty history and log.
    /// An over-long persisted list keeps its first (most recent) entries.
    pub fn from_persisted(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let names: Vec<String> = serde_json::from_slice(bytes)?;
        let mut history = Self::default();
        for name in names.iter().rev() {
            history.record(name);
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_prepends_most_recent_first() {
        let mut h = SearchHistory::default();
        h.record("London");
        h.record("Paris");
        h.record("Tokyo");
        assert_eq!(h.names(), vec!["Tokyo", "Paris", "London"]);
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_most_recent_position() {
        let mut h = SearchHistory::default();
        h.record("Paris");
        h.record("paris");
        h.record("London");
        assert_eq!(h.names(), vec!["London", "Paris"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = SearchHistory::default();
        for name in ["A", "B", "C", "D", "E", "F"] {
            h.record(name);
        }
        assert_eq!(h.names(), vec!["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn test_re_record_does_not_consume_capacity() {
        let mut h = SearchHistory::default();
        for name in ["A", "B", "C", "D", "E"] {
            h.record(name);
        }
        h.record("a");
        assert_eq!(h.names(), vec!["A", "E", "D", "C", "B"]);
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let mut h = SearchHistory::default();
        assert!(!h.record(""));
        assert!(!h.record("   "));
        assert!(h.is_empty());
    }

    #[test]
    fn test_clear_empties_the_list() {
        let mut h = SearchHistory::default();
        h.record("Oslo");
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.names(), Vec::<String>::new());
    }

    #[test]
    fn test_persist_round_trip_preserves_order() {
        let mut h = SearchHistory::default();
        h.record("Cairo");
        h.record("Lima");
        h.record("Oslo");
        let bytes = serde_json::to_vec(&h.names()).unwrap();
        let restored = SearchHistory::from_persisted(&bytes).unwrap();
        assert_eq!(restored.names(), vec!["Oslo", "Lima", "Cairo"]);
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        assert!(SearchHistory::from_persisted(b"{\"not\":\"a list\"}").is_err());
        assert!(SearchHistory::from_persisted(b"garbage").is_err());
        assert!(SearchHistory::from_persisted(b"[1,2,3]").is_err());
    }

    #[test]
    fn test_oversized_persisted_list_trims_to_capacity() {
        let bytes = br#"["A","B","C","D","E","F","G"]"#;
        let restored = SearchHistory::from_persisted(bytes).unwrap();
        assert_eq!(restored.names(), vec!["A", "B", "C", "D", "E"]);
    }
}
