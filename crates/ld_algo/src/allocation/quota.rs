//! Effective quota of a tier.
//!
//! Flat tiers draw their nominal quantity. Per-region tiers draw
//! `distinct regions among available entries × weight`. Callers evaluate this
//! once, when the tier becomes active, and keep the result for the whole tier.

use std::collections::BTreeSet;
use std::sync::Arc;

use ld_core::{AllocationPolicy, Entry, PrizeTier, RegionKey};

/// Distinct region buckets among `available`, in stable (sorted) order.
/// Entries without a tag contribute the single `None` bucket.
pub fn distinct_regions(available: &[Arc<Entry>]) -> BTreeSet<RegionKey> {
    available.iter().map(|e| e.region_key()).collect()
}

/// Draw quota for `tier` given the entries available right now.
pub fn effective_quota(tier: &PrizeTier, available: &[Arc<Entry>]) -> u32 {
    match tier.policy {
        AllocationPolicy::Flat => tier.quantity,
        AllocationPolicy::PerRegion { weight } => {
            let regions = u32::try_from(distinct_regions(available).len()).unwrap_or(u32::MAX);
            regions.saturating_mul(weight)
        }
    }
}
