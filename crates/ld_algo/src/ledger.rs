//! Winner ledger: ordered, append-only record of commits.
//!
//! Source of truth for "already won" exclusion and per-tier progress. The
//! ledger does not itself reject a repeated entry; exclusion happens upstream
//! through pool filtering.

use std::collections::HashSet;

use ld_core::{EntryId, Winner};

#[derive(Clone, Debug, Default)]
pub struct WinnerLedger {
    winners: Vec<Winner>,
    won: HashSet<EntryId>,
}

impl WinnerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit. Prior records are never touched.
    pub fn commit(&mut self, winner: Winner) {
        self.won.insert(winner.entry.id.clone());
        self.winners.push(winner);
    }

    /// Identifiers of every committed entry.
    pub fn won_identifiers(&self) -> &HashSet<EntryId> {
        &self.won
    }

    pub fn has_won(&self, id: &EntryId) -> bool {
        self.won.contains(id)
    }

    pub fn count_by_tier(&self, tier_name: &str) -> usize {
        self.winners.iter().filter(|w| w.tier_name == tier_name).count()
    }

    pub fn count_by_tier_index(&self, tier_index: usize) -> usize {
        self.winners.iter().filter(|w| w.tier_index == tier_index).count()
    }

    /// Global 1-based number of the next turn.
    pub fn next_turn(&self) -> u32 {
        u32::try_from(self.winners.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    pub fn last(&self) -> Option<&Winner> {
        self.winners.last()
    }

    pub fn as_slice(&self) -> &[Winner] {
        &self.winners
    }

    pub fn iter(&self) -> impl Iterator<Item = &Winner> {
        self.winners.iter()
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// Explicit reset only.
    pub fn clear(&mut self) {
        self.winners.clear();
        self.won.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ld_core::Entry;
    use std::sync::Arc;

    fn winner(id: &str, tier_index: usize, tier: &str, turn: u32) -> Winner {
        Winner {
            entry: Arc::new(Entry::new(EntryId::new(id).unwrap(), id, "0911111111")),
            tier_index,
            tier_name: tier.into(),
            tier_value: "1.000.000đ".into(),
            turn,
            committed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn commit_appends_and_tracks_ids() {
        let mut l = WinnerLedger::new();
        assert_eq!(l.next_turn(), 1);
        l.commit(winner("A", 0, "First", 1));
        l.commit(winner("B", 1, "Second", 2));
        l.commit(winner("C", 1, "Second", 3));
        assert_eq!(l.len(), 3);
        assert_eq!(l.next_turn(), 4);
        assert!(l.has_won(&EntryId::new("B").unwrap()));
        assert_eq!(l.count_by_tier("Second"), 2);
        assert_eq!(l.count_by_tier_index(0), 1);
        assert_eq!(l.last().unwrap().entry_id().as_str(), "C");
        let order: Vec<_> = l.iter().map(|w| w.turn).collect();
        assert_eq!(order, [1, 2, 3]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut l = WinnerLedger::new();
        l.commit(winner("A", 0, "First", 1));
        l.clear();
        assert!(l.is_empty());
        assert!(l.won_identifiers().is_empty());
        assert_eq!(l.next_turn(), 1);
    }
}
