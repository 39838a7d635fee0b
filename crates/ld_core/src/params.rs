//! params.rs: Draw timing, override rules, and the parameter bundle.
//!
//! Overrides are plain data: `{ turn number → entry id }`, consulted when a
//! draw settles. A rule only fires if its entry is still available at that turn.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::ids::EntryId;

pub const DEFAULT_SPIN_MS: u64 = 7_000;
pub const DEFAULT_RESAMPLE_MS: u64 = 30;
pub const DEFAULT_REVEAL_MS: u64 = 400;

/// Animation timing of one draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Length of the animating window before the winner is resolved.
    pub spin: Duration,
    /// Interval of the cosmetic candidate resampling.
    pub resample: Duration,
    /// Delay between commit and the "winner ready" signal.
    pub reveal: Duration,
}

impl Timing {
    pub fn from_millis(spin_ms: u64, resample_ms: u64, reveal_ms: u64) -> Result<Self, CoreError> {
        let t = Self {
            spin: Duration::from_millis(spin_ms),
            resample: Duration::from_millis(resample_ms),
            reveal: Duration::from_millis(reveal_ms),
        };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.spin.is_zero() {
            return Err(CoreError::InvalidTiming("spin must be > 0"));
        }
        if self.resample.is_zero() {
            return Err(CoreError::InvalidTiming("resample interval must be > 0"));
        }
        if self.reveal.is_zero() {
            return Err(CoreError::InvalidTiming("reveal delay must be > 0"));
        }
        if self.resample > self.spin {
            return Err(CoreError::InvalidTiming("resample interval must not exceed spin"));
        }
        Ok(())
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            spin: Duration::from_millis(DEFAULT_SPIN_MS),
            resample: Duration::from_millis(DEFAULT_RESAMPLE_MS),
            reveal: Duration::from_millis(DEFAULT_REVEAL_MS),
        }
    }
}

/// Forced winners keyed by global 1-based turn number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideRules(BTreeMap<u32, EntryId>);

impl OverrideRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, turn: u32, id: EntryId) -> Result<Option<EntryId>, CoreError> {
        if turn == 0 {
            return Err(CoreError::InvalidOverride { turn, reason: "turns are numbered from 1" });
        }
        Ok(self.0.insert(turn, id))
    }

    pub fn for_turn(&self, turn: u32) -> Option<&EntryId> {
        self.0.get(&turn)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &EntryId)> + '_ {
        self.0.iter().map(|(t, id)| (*t, id))
    }
}

/// Everything the engine needs besides entries and the schedule.
#[derive(Clone, Debug, Default)]
pub struct DrawParams {
    pub timing: Timing,
    pub overrides: OverrideRules,
    /// `None` seeds the RNG from OS entropy.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_is_valid() {
        let t = Timing::default();
        assert!(t.validate().is_ok());
        assert_eq!(t.spin, Duration::from_secs(7));
    }

    #[test]
    fn timing_rejects_zero_and_inverted() {
        assert!(Timing::from_millis(0, 30, 400).is_err());
        assert!(Timing::from_millis(100, 0, 400).is_err());
        assert!(Timing::from_millis(100, 30, 0).is_err());
        assert!(Timing::from_millis(20, 30, 400).is_err());
        assert!(Timing::from_millis(3_000, 30, 400).is_ok());
    }

    #[test]
    fn override_turn_zero_rejected() {
        let mut rules = OverrideRules::new();
        let id = EntryId::new("INV001").unwrap();
        assert!(rules.insert(0, id.clone()).is_err());
        assert_eq!(rules.insert(1, id.clone()).unwrap(), None);
        assert_eq!(rules.for_turn(1), Some(&id));
        assert_eq!(rules.for_turn(2), None);
    }
}
