//! crates/ld_report/src/model.rs
//! Report data model: tiers in schedule order, each with its committed winners.

use chrono::{DateTime, Utc};

use ld_algo::PrizeSchedule;
use ld_core::{PrizeTier, Winner};

use crate::ReportError;

/// Provenance block carried into every rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportMeta {
    pub generated_at: Option<DateTime<Utc>>,
    pub total_entries: usize,
    pub seed: Option<u64>,
    pub entries_sha256: Option<String>,
    pub winners_sha256: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierReport {
    pub index: usize,
    pub name: String,
    pub value: String,
    /// Nominal quantity from the schedule.
    pub quantity: u32,
    /// Effective quota (frozen or projected).
    pub quota: u32,
    /// Commit order.
    pub winners: Vec<Winner>,
}

impl TierReport {
    pub fn drawn(&self) -> usize {
        self.winners.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportModel {
    pub meta: ReportMeta,
    pub tiers: Vec<TierReport>,
    /// Every winner, commit order.
    pub winners: Vec<Winner>,
}

impl ReportModel {
    pub fn total_winners(&self) -> usize {
        self.winners.len()
    }
}

/// Winners grouped per tier, schedule order. Tiers without winners are kept.
pub fn winners_by_tier<'a>(
    schedule: &'a PrizeSchedule,
    winners: &'a [Winner],
) -> Vec<(&'a PrizeTier, Vec<&'a Winner>)> {
    schedule
        .iter()
        .enumerate()
        .map(|(i, tier)| (tier, winners.iter().filter(|w| w.tier_index == i).collect()))
        .collect()
}

/// Build the model. `quotas` must hold one value per tier.
pub fn build_model(
    schedule: &PrizeSchedule,
    winners: &[Winner],
    quotas: &[u32],
    meta: ReportMeta,
) -> Result<ReportModel, ReportError> {
    if quotas.len() != schedule.len() {
        return Err(ReportError::Inconsistent(format!(
            "{} quotas for {} tiers",
            quotas.len(),
            schedule.len()
        )));
    }
    for w in winners {
        match schedule.get(w.tier_index) {
            Some(t) if t.name == w.tier_name => {}
            _ => {
                return Err(ReportError::Inconsistent(format!(
                    "winner {} (turn {}) references unknown tier {:?}",
                    w.entry.id, w.turn, w.tier_name
                )))
            }
        }
    }

    let tiers = winners_by_tier(schedule, winners)
        .into_iter()
        .zip(quotas)
        .enumerate()
        .map(|(index, ((tier, ws), &quota))| TierReport {
            index,
            name: tier.name.clone(),
            value: tier.value.clone(),
            quantity: tier.quantity,
            quota,
            winners: ws.into_iter().cloned().collect(),
        })
        .collect();

    Ok(ReportModel {
        meta,
        tiers,
        winners: winners.to_vec(),
    })
}
