//! Final winner resolution at settle time.
//!
//! Priority order:
//! 1. an override rule for the current global turn whose entry is available;
//! 2. the region scheduled for this draw ordinal (per-region tiers), falling
//!    back to the whole available pool when that region has no candidates;
//! 3. a uniform pick over the whole available pool.

use std::sync::Arc;

use ld_core::{DrawRng, Entry, OverrideRules, RegionKey};

use crate::allocation::AllocationPlan;

/// Which rule produced the winner (reported in logs and events).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Override,
    Region(RegionKey),
    /// Scheduled region had no available candidates.
    RegionFallback(RegionKey),
    Uniform,
}

#[derive(Clone, Debug)]
pub struct Resolved {
    pub entry: Arc<Entry>,
    pub selection: Selection,
}

/// Resolve the winner of one draw. `None` only when `available` is empty.
pub fn resolve_winner(
    available: &[Arc<Entry>],
    turn: u32,
    overrides: &OverrideRules,
    plan: Option<&AllocationPlan>,
    ordinal: u32,
    rng: &mut DrawRng,
) -> Option<Resolved> {
    if let Some(target) = overrides.for_turn(turn) {
        if let Some(hit) = available.iter().find(|e| &e.id == target) {
            return Some(Resolved {
                entry: Arc::clone(hit),
                selection: Selection::Override,
            });
        }
    }

    if let Some(region) = plan.and_then(|p| p.region_for(ordinal)) {
        let candidates: Vec<&Arc<Entry>> = available
            .iter()
            .filter(|e| e.region.as_ref() == region.as_ref())
            .collect();
        if let Some(&pick) = rng.choose(&candidates) {
            return Some(Resolved {
                entry: Arc::clone(pick),
                selection: Selection::Region(region.clone()),
            });
        }
        return rng.choose(available).map(|pick| Resolved {
            entry: Arc::clone(pick),
            selection: Selection::RegionFallback(region.clone()),
        });
    }

    rng.choose(available).map(|pick| Resolved {
        entry: Arc::clone(pick),
        selection: Selection::Uniform,
    })
}
