//! entities.rs: Entry, prize tier, allocation policy, and winner records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{EntryId, RegionTag};

/// Region bucket of an entry. Entries without a tag share the `None` bucket,
/// which counts as one distinct region for per-region allocation.
pub type RegionKey = Option<RegionTag>;

/// Upper bound on the per-region weight. A tier schedules `regions × weight`
/// draws up front, so the weight must stay small.
pub const MAX_REGION_WEIGHT: u32 = 100;

// ----------------------------------- Entry -----------------------------------

/// An immutable eligible record. The pool shares entries by `Arc`, and winners
/// point at the same allocation, so identity is preserved across the session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    /// Raw contact number as imported; display code should use `masked_phone`.
    pub phone: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub amount: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub region: Option<RegionTag>,
}

impl Entry {
    pub fn new(id: EntryId, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            amount: None,
            region: None,
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_region(mut self, region: RegionTag) -> Self {
        self.region = Some(region);
        self
    }

    /// Region bucket used by the allocation planner.
    pub fn region_key(&self) -> RegionKey {
        self.region.clone()
    }

    /// Contact number with its last four characters hidden.
    pub fn masked_phone(&self) -> String {
        let chars: Vec<char> = self.phone.chars().collect();
        let keep = chars.len().saturating_sub(4);
        let mut out: String = chars[..keep].iter().collect();
        out.push_str("****");
        out
    }
}

// ----------------------------- Allocation policy -----------------------------

/// How a tier's effective quota is computed when it becomes active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum AllocationPolicy {
    /// Quota is the tier's nominal quantity.
    Flat,
    /// Quota is `distinct regions among available entries × weight`.
    PerRegion { weight: u32 },
}

impl AllocationPolicy {
    pub fn is_per_region(&self) -> bool {
        matches!(self, AllocationPolicy::PerRegion { .. })
    }
}

// --------------------------------- Prize tier --------------------------------

/// One element of the prize schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrizeTier {
    pub name: String,
    /// Display value, e.g. `"5.000.000đ"`.
    pub value: String,
    /// Nominal quantity. Authoritative for flat tiers; informative for
    /// per-region tiers, whose quota is derived at activation.
    pub quantity: u32,
    pub policy: AllocationPolicy,
}

impl PrizeTier {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        quantity: u32,
        policy: AllocationPolicy,
    ) -> Result<Self, CoreError> {
        let tier = Self {
            name: name.into().trim().to_string(),
            value: value.into().trim().to_string(),
            quantity,
            policy,
        };
        tier.validate()?;
        Ok(tier)
    }

    pub fn flat(name: impl Into<String>, value: impl Into<String>, quantity: u32) -> Result<Self, CoreError> {
        Self::new(name, value, quantity, AllocationPolicy::Flat)
    }

    pub fn per_region(
        name: impl Into<String>,
        value: impl Into<String>,
        quantity: u32,
        weight: u32,
    ) -> Result<Self, CoreError> {
        Self::new(name, value, quantity, AllocationPolicy::PerRegion { weight })
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let bad = |reason| CoreError::InvalidTier { tier: self.name.clone(), reason };
        if self.name.is_empty() {
            return Err(bad("name must not be empty"));
        }
        if self.quantity == 0 {
            return Err(bad("quantity must be at least 1"));
        }
        if let AllocationPolicy::PerRegion { weight } = self.policy {
            if weight == 0 {
                return Err(bad("per-region weight must be at least 1"));
            }
            if weight > MAX_REGION_WEIGHT {
                return Err(bad("per-region weight exceeds 100"));
            }
        }
        Ok(())
    }
}

// ----------------------------------- Winner ----------------------------------

/// Commit record. `entry` shares the pool's allocation (no copy).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Winner {
    pub entry: Arc<Entry>,
    /// Position of the tier in the schedule at commit time.
    pub tier_index: usize,
    pub tier_name: String,
    pub tier_value: String,
    /// Global 1-based turn number (`winners committed before + 1`).
    pub turn: u32,
    pub committed_at: DateTime<Utc>,
}

impl Winner {
    pub fn entry_id(&self) -> &EntryId {
        &self.entry.id
    }
}
