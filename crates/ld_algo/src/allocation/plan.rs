//! Per-tier allocation plan, built lazily on the first draw of a tier.
//!
//! The quota and region schedule are frozen at activation; later changes to
//! the available region set do not move them. The plan is discarded when the
//! tier is exhausted or results are reset.

use std::sync::Arc;

use ld_core::{DrawRng, Entry, PrizeTier, RegionKey};

use super::quota::effective_quota;
use super::region_schedule::{build_region_schedule, RegionSchedule};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationPlan {
    pub tier_index: usize,
    pub quota: u32,
    pub schedule: Option<RegionSchedule>,
}

impl AllocationPlan {
    /// Freeze quota and (for per-region tiers) the shuffled region schedule.
    pub fn activate(
        tier_index: usize,
        tier: &PrizeTier,
        available: &[Arc<Entry>],
        rng: &mut DrawRng,
    ) -> Self {
        Self {
            tier_index,
            quota: effective_quota(tier, available),
            schedule: build_region_schedule(tier, available, rng),
        }
    }

    /// Region governing the draw at `ordinal`, if this is a per-region plan.
    pub fn region_for(&self, ordinal: u32) -> Option<&RegionKey> {
        self.schedule.as_ref()?.slot(ordinal as usize)
    }

    pub fn is_complete(&self, draws_done: u32) -> bool {
        draws_done >= self.quota
    }
}
