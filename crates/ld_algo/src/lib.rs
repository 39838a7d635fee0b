// crates/ld_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Algorithm layer of the draw engine. Pure data structures and choices; no
//! timers, no I/O. Every random decision takes a `&mut DrawRng` so a seeded
//! session replays exactly.

pub use ld_core::{
    entities::{AllocationPolicy, Entry, PrizeTier, RegionKey, Winner},
    ids::{EntryId, RegionTag},
    rng::DrawRng,
};

// ----------------------------- Pool, ledger, schedule -------------------------

pub mod pool;
pub mod ledger;
pub mod schedule;

pub use ledger::WinnerLedger;
pub use pool::EntryPool;
pub use schedule::PrizeSchedule;

// ----------------------------- Allocation (public surface) --------------------

pub mod allocation {
    pub mod quota;
    pub mod region_schedule;
    pub mod plan;

    pub use plan::AllocationPlan;
    pub use quota::{distinct_regions, effective_quota};
    pub use region_schedule::{build_region_schedule, RegionSchedule};
}

pub use allocation::{build_region_schedule, distinct_regions, effective_quota, AllocationPlan, RegionSchedule};

// ----------------------------- Winner selection -------------------------------

pub mod select;

pub use select::{resolve_winner, Resolved, Selection};
