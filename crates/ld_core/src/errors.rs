//! errors.rs: Error taxonomy shared by every layer.
//!
//! `CoreError` covers domain validation of values (ids, tiers, timing).
//! `DrawError` is the set of *declined operations*: each one is local and
//! recoverable, and a declined call leaves all session state unchanged.

use thiserror::Error;

use crate::ids::EntryId;

/// Domain validation failures for core values.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid entry id: {0:?}")]
    InvalidId(String),
    #[error("invalid region tag: {0:?}")]
    InvalidRegion(String),
    #[error("prize schedule has no tiers")]
    EmptySchedule,
    #[error("invalid prize tier {tier:?}: {reason}")]
    InvalidTier { tier: String, reason: &'static str },
    #[error("invalid timing: {0}")]
    InvalidTiming(&'static str),
    #[error("invalid override for turn {turn}: {reason}")]
    InvalidOverride { turn: u32, reason: &'static str },
}

/// Reasons a draw-engine operation was declined.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DrawError {
    /// `start()` with an empty available pool.
    #[error("no eligible entries left to draw from")]
    NoEligibleEntries,
    /// `start()` after every tier of the schedule was completed.
    #[error("all prize tiers have been drawn")]
    ScheduleExhausted,
    /// `start()` while a draw is already animating or settling.
    #[error("a draw is already in progress")]
    DrawInProgress,
    /// `reset_results()` / `clear_all()` while a draw is in flight.
    #[error("cannot reset while a draw is in progress")]
    InvalidResetState,
    /// Import attempted to add an identifier already present in the pool.
    #[error("duplicate entry identifier: {0}")]
    DuplicateIdentifier(EntryId),
    /// A timed transition arrived in a phase that does not accept it.
    #[error("unexpected transition {transition} in phase {phase}")]
    UnexpectedTransition {
        transition: &'static str,
        phase: &'static str,
    },
    /// The async driver task is gone (handle outlived the engine).
    #[error("draw engine stopped")]
    EngineStopped,
}
