//! Prize schedule: ordered tiers, drawn strictly in order.

use std::collections::HashSet;

use ld_core::{errors::CoreError, PrizeTier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrizeSchedule {
    tiers: Vec<PrizeTier>,
}

impl PrizeSchedule {
    /// Validates every tier and requires unique, non-empty tier names
    /// (the ledger groups winners by tier name).
    pub fn new(tiers: Vec<PrizeTier>) -> Result<Self, CoreError> {
        if tiers.is_empty() {
            return Err(CoreError::EmptySchedule);
        }
        let mut seen = HashSet::new();
        for t in &tiers {
            t.validate()?;
            if !seen.insert(t.name.as_str()) {
                return Err(CoreError::InvalidTier {
                    tier: t.name.clone(),
                    reason: "duplicate tier name",
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn get(&self, index: usize) -> Option<&PrizeTier> {
        self.tiers.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrizeTier> {
        self.tiers.iter()
    }

    pub fn as_slice(&self) -> &[PrizeTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
