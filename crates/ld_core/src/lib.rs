//! ld_core: Core types, error taxonomy, draw parameters, and seedable RNG.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`ld_algo`, `ld_engine`, `ld_io`, `ld_report`, `ld_cli`).
//!
//! - Identifiers: `EntryId`, `RegionTag`
//! - Entities: `Entry`, `PrizeTier`, `AllocationPolicy`, `Winner`
//! - Parameters: `Timing`, `OverrideRules`, `DrawParams`
//! - Errors: `CoreError` (domain validation), `DrawError` (declined operations)
//! - Seedable RNG (ChaCha20) for every random choice the engine makes
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod entities;
pub mod params;
pub mod rng;

pub use errors::{CoreError, DrawError};
pub use ids::{EntryId, RegionTag};
pub use entities::{AllocationPolicy, Entry, PrizeTier, RegionKey, Winner, MAX_REGION_WEIGHT};
pub use params::{DrawParams, OverrideRules, Timing};
pub use rng::DrawRng;
