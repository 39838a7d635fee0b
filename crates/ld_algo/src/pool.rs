//! Entry pool: owns every eligible entry for the session.
//!
//! Entries are shared as `Arc<Entry>`; the "available" subset is derived on
//! demand by excluding identifiers the ledger has already recorded.

use std::collections::HashSet;
use std::sync::Arc;

use ld_core::{errors::DrawError, Entry, EntryId};

use crate::ledger::WinnerLedger;

#[derive(Clone, Debug, Default)]
pub struct EntryPool {
    entries: Vec<Arc<Entry>>,
    ids: HashSet<EntryId>,
}

impl EntryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from already-deduplicated entries; the first duplicate aborts.
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Result<Self, DrawError> {
        let mut pool = Self::new();
        for e in entries {
            pool.add_entry(e)?;
        }
        Ok(pool)
    }

    /// Append an entry. Fails with `DuplicateIdentifier` if the id is present.
    pub fn add_entry(&mut self, entry: Entry) -> Result<Arc<Entry>, DrawError> {
        if self.ids.contains(&entry.id) {
            return Err(DrawError::DuplicateIdentifier(entry.id));
        }
        self.ids.insert(entry.id.clone());
        let entry = Arc::new(entry);
        self.entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// Entries whose id is absent from the ledger, in insertion order.
    pub fn available_entries(&self, ledger: &WinnerLedger) -> Vec<Arc<Entry>> {
        let won = ledger.won_identifiers();
        self.entries
            .iter()
            .filter(|e| !won.contains(&e.id))
            .cloned()
            .collect()
    }

    pub fn available_count(&self, ledger: &WinnerLedger) -> usize {
        let won = ledger.won_identifiers();
        self.entries.iter().filter(|e| !won.contains(&e.id)).count()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&Arc<Entry>> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (full data reset only).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ld_core::Winner;

    fn entry(id: &str) -> Entry {
        Entry::new(EntryId::new(id).unwrap(), format!("name {id}"), "0900000000")
    }

    #[test]
    fn duplicate_identifier_rejected() {
        let mut pool = EntryPool::new();
        pool.add_entry(entry("A")).unwrap();
        let err = pool.add_entry(entry("A")).unwrap_err();
        assert_eq!(err, DrawError::DuplicateIdentifier(EntryId::new("A").unwrap()));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn available_excludes_winners_preserving_order() {
        let pool = EntryPool::from_entries(["A", "B", "C", "D"].map(entry)).unwrap();
        let mut ledger = WinnerLedger::new();
        let b = Arc::clone(pool.get(&EntryId::new("B").unwrap()).unwrap());
        ledger.commit(Winner {
            entry: b,
            tier_index: 0,
            tier_name: "T".into(),
            tier_value: "1".into(),
            turn: 1,
            committed_at: Utc.timestamp_opt(0, 0).unwrap(),
        });
        let ids: Vec<_> = pool
            .available_entries(&ledger)
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["A", "C", "D"]);
        assert_eq!(pool.available_count(&ledger), 3);
    }

    #[test]
    fn clear_empties_pool() {
        let mut pool = EntryPool::from_entries(["A", "B"].map(entry)).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert!(pool.add_entry(entry("A")).is_ok());
    }
}
