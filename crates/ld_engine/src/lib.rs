//! ld_engine: draw orchestration (start → animate → settle → commit → reveal).
//!
//! Two layers:
//! - `session`: the synchronous state machine `DrawSession`. Every transition
//!   is an explicit method call; nothing here sleeps or spawns. Tests and
//!   replay tools drive it directly.
//! - `machine`: the async driver `DrawMachine`. One tokio task owns the
//!   session and the timers (cosmetic resampling, settle deadline, reveal
//!   delay); callers talk to it through a command channel and read events.

#![forbid(unsafe_code)]

pub mod session;
pub mod machine;

pub use machine::{DrawEvent, DrawMachine, Spawned};
pub use session::{DrawSession, DrawTicket, Phase, SessionSnapshot, TierStatus};

pub use ld_algo::{EntryPool, PrizeSchedule, Selection, WinnerLedger};
pub use ld_core::{DrawError, DrawParams, Entry, EntryId, PrizeTier, Timing, Winner};
