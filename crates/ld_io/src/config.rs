//! Draw configuration file.
//!
//! ```json
//! {
//!   "tiers": [
//!     { "name": "Giải Nhất", "value": "5.000.000đ", "quantity": 1, "allocation": { "policy": "flat" } },
//!     { "name": "Giải Nhì",  "value": "3.000.000đ", "quantity": 3, "allocation": { "policy": "per_region", "weight": 1 } }
//!   ],
//!   "overrides": { "1": "HD001" },
//!   "timing": { "spin_ms": 7000, "resample_ms": 30, "reveal_ms": 400 },
//!   "seed": 42
//! }
//! ```
//!
//! Unknown fields are rejected. `overrides`, `timing`, and `seed` are optional.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use ld_algo::PrizeSchedule;
use ld_core::params::{DEFAULT_RESAMPLE_MS, DEFAULT_REVEAL_MS, DEFAULT_SPIN_MS};
use ld_core::{AllocationPolicy, CoreError, DrawParams, EntryId, OverrideRules, PrizeTier, Timing};

use crate::{IoError, IoResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawConfig {
    pub tiers: Vec<TierConfig>,
    /// Turn number (decimal string, ≥ 1) → entry id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    pub name: String,
    pub value: String,
    pub quantity: u32,
    pub allocation: AllocationPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub spin_ms: u64,
    pub resample_ms: u64,
    pub reveal_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            spin_ms: DEFAULT_SPIN_MS,
            resample_ms: DEFAULT_RESAMPLE_MS,
            reveal_ms: DEFAULT_REVEAL_MS,
        }
    }
}

impl Default for DrawConfig {
    /// The standard four-tier prize table; no overrides.
    fn default() -> Self {
        let tier = |name: &str, value: &str, quantity, allocation| TierConfig {
            name: name.into(),
            value: value.into(),
            quantity,
            allocation,
        };
        Self {
            tiers: vec![
                tier("Giải Nhất", "5.000.000đ", 1, AllocationPolicy::Flat),
                tier("Giải Nhì", "3.000.000đ", 3, AllocationPolicy::PerRegion { weight: 1 }),
                tier("Giải Ba", "2.000.000đ", 6, AllocationPolicy::PerRegion { weight: 2 }),
                tier("Giải Khuyến Khích", "1.000.000đ", 10, AllocationPolicy::Flat),
            ],
            overrides: BTreeMap::new(),
            timing: TimingConfig::default(),
            seed: None,
        }
    }
}

impl DrawConfig {
    /// Build and validate the prize schedule.
    pub fn schedule(&self) -> IoResult<PrizeSchedule> {
        let tiers = self
            .tiers
            .iter()
            .map(|t| PrizeTier::new(t.name.as_str(), t.value.as_str(), t.quantity, t.allocation))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PrizeSchedule::new(tiers)?)
    }

    /// Build and validate timing, overrides, and seed.
    pub fn params(&self) -> IoResult<DrawParams> {
        let t = self.timing;
        let timing = Timing::from_millis(t.spin_ms, t.resample_ms, t.reveal_ms)?;

        let mut overrides = OverrideRules::new();
        for (turn, id) in &self.overrides {
            let turn: u32 = turn.trim().parse().map_err(|_| {
                IoError::Invalid(format!("override turn {turn:?} is not a positive integer"))
            })?;
            let id = EntryId::new(id)?;
            if overrides.insert(turn, id)?.is_some() {
                return Err(IoError::Invalid(format!("duplicate override turn {turn}")));
            }
        }

        Ok(DrawParams {
            timing,
            overrides,
            seed: self.seed,
        })
    }

    /// Full validation without keeping the results.
    pub fn validate(&self) -> IoResult<()> {
        self.schedule()?;
        self.params()?;
        Ok(())
    }

    /// Set an override (CLI `--override TURN=ID`), replacing any rule for that turn.
    pub fn set_override(&mut self, turn: u32, id: &str) -> Result<(), CoreError> {
        if turn == 0 {
            return Err(CoreError::InvalidOverride { turn, reason: "turns start at 1" });
        }
        let id = EntryId::new(id)?;
        self.overrides.insert(turn.to_string(), id.as_str().to_string());
        Ok(())
    }
}

pub fn load_config(path: &Path) -> IoResult<DrawConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let cfg = parse_config(&text)?;
    info!(path = %path.display(), tiers = cfg.tiers.len(), overrides = cfg.overrides.len(), "config loaded");
    Ok(cfg)
}

/// Parse and validate.
pub fn parse_config(text: &str) -> IoResult<DrawConfig> {
    let cfg: DrawConfig = serde_json::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config_is_valid_and_ordered() {
        let cfg = DrawConfig::default();
        let schedule = cfg.schedule().unwrap();
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.get(0).unwrap().name, "Giải Nhất");
        assert_eq!(schedule.get(2).unwrap().policy, AllocationPolicy::PerRegion { weight: 2 });
        let params = cfg.params().unwrap();
        assert_eq!(params.timing, Timing::default());
        assert!(params.overrides.is_empty());
        assert!(params.seed.is_none());
    }

    #[test]
    fn parses_full_document() {
        let cfg = parse_config(
            r#"{
                "tiers": [
                    {"name": "A", "value": "1đ", "quantity": 2, "allocation": {"policy": "flat"}},
                    {"name": "B", "value": "2đ", "quantity": 3, "allocation": {"policy": "per_region", "weight": 2}}
                ],
                "overrides": {"1": "HD001", "3": "HD002"},
                "timing": {"spin_ms": 1000, "resample_ms": 10},
                "seed": 99
            }"#,
        )
        .unwrap();
        let params = cfg.params().unwrap();
        assert_eq!(params.timing.spin, Duration::from_millis(1000));
        assert_eq!(params.timing.reveal, Duration::from_millis(DEFAULT_REVEAL_MS));
        assert_eq!(params.overrides.for_turn(3).map(|id| id.as_str()), Some("HD002"));
        assert_eq!(params.seed, Some(99));
        assert_eq!(cfg.schedule().unwrap().get(1).unwrap().quantity, 3);
    }

    #[test]
    fn rejects_invalid_documents() {
        let bad = [
            r#"{"tiers": []}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 0, "allocation": {"policy": "flat"}}]}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "per_region", "weight": 0}}]}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "per_region", "weight": 101}}]}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "per_region", "weight": 4294967295}}]}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}}], "overrides": {"01": "HD_B", "1": "HD_A"}}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}},
                          {"name": "A", "value": "2", "quantity": 1, "allocation": {"policy": "flat"}}]}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}}], "overrides": {"0": "X"}}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}}], "overrides": {"first": "X"}}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}}], "timing": {"spin_ms": 10, "resample_ms": 20}}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "flat"}}], "colour": "red"}"#,
            r#"{"tiers": [{"name": "A", "value": "1", "quantity": 1, "allocation": {"policy": "lottery"}}]}"#,
        ];
        for doc in bad {
            assert!(parse_config(doc).is_err(), "accepted: {doc}");
        }
    }

    #[test]
    fn override_turns_must_be_distinct_numbers() {
        let mut cfg = DrawConfig::default();
        cfg.overrides.insert("01".into(), "HD_B".into());
        cfg.overrides.insert("1".into(), "HD_A".into());
        match cfg.params() {
            Err(IoError::Invalid(msg)) => assert_eq!(msg, "duplicate override turn 1"),
            other => panic!("expected duplicate turn, got {other:?}"),
        }

        cfg.overrides.remove("01");
        cfg.overrides.insert(" 2".into(), "HD_B".into());
        let params = cfg.params().unwrap();
        assert_eq!(params.overrides.len(), 2);
        assert_eq!(params.overrides.for_turn(2).map(|i| i.as_str()), Some("HD_B"));
    }

    #[test]
    fn set_override_validates() {
        let mut cfg = DrawConfig::default();
        cfg.set_override(2, "HD009").unwrap();
        assert_eq!(cfg.params().unwrap().overrides.for_turn(2).map(|i| i.as_str()), Some("HD009"));
        assert!(cfg.set_override(0, "HD009").is_err());
        assert!(cfg.set_override(1, "bad id").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let text = serde_json::to_string_pretty(&DrawConfig::default()).unwrap();
        fs::write(&path, text).unwrap();
        assert_eq!(load_config(&path).unwrap(), DrawConfig::default());
    }
}
