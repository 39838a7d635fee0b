//! DrawSession: the draw state machine.
//!
//! ```text
//!   Idle ──start()──▶ Animating ──settle(t)──▶ Settling ──finish()──▶ Idle
//!     │                  │ resample() (cosmetic)
//!     └── tier index ≥ schedule length ⇒ AllTiersExhausted (terminal)
//! ```
//!
//! `start()` snapshots the turn, tier, and draw ordinal into a `DrawTicket`;
//! `settle()` resolves and commits against that ticket, never against the
//! live counters. Calls arriving in the wrong phase are declined with a
//! `DrawError` and change nothing.
//!
//! Two RNG streams: decisions (region schedule, winner) and display
//! (cosmetic resampling). With a fixed seed the committed winners therefore
//! do not depend on how many animation frames were rendered.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use ld_algo::{
    allocation::AllocationPlan, effective_quota, resolve_winner, EntryPool, PrizeSchedule,
    Resolved, Selection, WinnerLedger,
};
use ld_core::{AllocationPolicy, DrawError, DrawParams, DrawRng, Entry, Winner};

/// Seed perturbation for the display stream.
const DISPLAY_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Animating,
    Settling,
    AllTiersExhausted,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Animating => "animating",
            Phase::Settling => "settling",
            Phase::AllTiersExhausted => "all_tiers_exhausted",
        }
    }
}

/// Snapshot taken when a draw starts. The commit uses these values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawTicket {
    /// Global 1-based turn number.
    pub turn: u32,
    pub tier_index: usize,
    /// Draws already completed in the tier when this one started.
    pub ordinal: u32,
}

#[derive(Debug)]
enum DrawState {
    Idle,
    Animating(DrawTicket),
    Settling { ticket: DrawTicket, winner: Winner },
}

/// Progress of the active tier, for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierStatus {
    pub index: usize,
    pub name: String,
    pub value: String,
    pub policy: AllocationPolicy,
    /// Frozen quota once the tier is active, otherwise projected from the current pool.
    pub quota: u32,
    pub quota_frozen: bool,
    pub drawn: u32,
    pub remaining: u32,
}

/// Read model handed to the presentation layer.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub total_entries: usize,
    pub available_entries: usize,
    pub total_winners: usize,
    pub current_tier: Option<TierStatus>,
    /// Prizes still to be drawn across the whole schedule.
    pub remaining_prizes: u32,
    pub displayed: Option<Arc<Entry>>,
    pub last_winner: Option<Winner>,
    /// Commit order.
    pub winners: Vec<Winner>,
}

#[derive(Debug)]
pub struct DrawSession {
    pool: EntryPool,
    ledger: WinnerLedger,
    schedule: PrizeSchedule,
    params: DrawParams,
    rng: DrawRng,
    display_rng: DrawRng,
    tier_index: usize,
    drawn_in_tier: u32,
    plan: Option<AllocationPlan>,
    state: DrawState,
    displayed: Option<Arc<Entry>>,
    last_selection: Option<Selection>,
}

impl DrawSession {
    /// New session with an empty pool. RNG streams come from `params.seed`.
    pub fn new(schedule: PrizeSchedule, params: DrawParams) -> Self {
        let rng = DrawRng::from_optional_seed(params.seed);
        let display_rng = DrawRng::from_optional_seed(params.seed.map(|s| s ^ DISPLAY_STREAM_SALT));
        Self {
            pool: EntryPool::new(),
            ledger: WinnerLedger::new(),
            schedule,
            params,
            rng,
            display_rng,
            tier_index: 0,
            drawn_in_tier: 0,
            plan: None,
            state: DrawState::Idle,
            displayed: None,
            last_selection: None,
        }
    }

    /// New session over an existing pool.
    pub fn with_pool(pool: EntryPool, schedule: PrizeSchedule, params: DrawParams) -> Self {
        let mut s = Self::new(schedule, params);
        s.pool = pool;
        s
    }

    // ------------------------------------------------------------------
    // Import side
    // ------------------------------------------------------------------

    pub fn add_entry(&mut self, entry: Entry) -> Result<Arc<Entry>, DrawError> {
        if self.in_flight() {
            return Err(DrawError::DrawInProgress);
        }
        self.pool.add_entry(entry)
    }

    /// Full data reset: drops the pool and every result.
    pub fn clear_all(&mut self) -> Result<(), DrawError> {
        self.reset_results()?;
        self.pool.clear();
        info!("entry pool cleared");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `Idle → Animating`. Activates the tier's allocation plan on its first draw.
    pub fn start(&mut self) -> Result<DrawTicket, DrawError> {
        if !matches!(self.state, DrawState::Idle) {
            return Err(DrawError::DrawInProgress);
        }
        let available = self.pool.available_entries(&self.ledger);
        if available.is_empty() {
            debug!("start declined: no eligible entries");
            return Err(DrawError::NoEligibleEntries);
        }
        let Some(tier) = self.schedule.get(self.tier_index) else {
            debug!("start declined: schedule exhausted");
            return Err(DrawError::ScheduleExhausted);
        };

        if self.plan.as_ref().map(|p| p.tier_index) != Some(self.tier_index) {
            let plan = AllocationPlan::activate(self.tier_index, tier, &available, &mut self.rng);
            info!(
                tier = %tier.name,
                tier_index = self.tier_index,
                quota = plan.quota,
                per_region = plan.schedule.is_some(),
                "tier activated"
            );
            self.plan = Some(plan);
        }

        let ticket = DrawTicket {
            turn: self.ledger.next_turn(),
            tier_index: self.tier_index,
            ordinal: self.drawn_in_tier,
        };
        self.displayed = self.display_rng.choose(&available).cloned();
        self.state = DrawState::Animating(ticket);
        debug!(turn = ticket.turn, tier_index = ticket.tier_index, ordinal = ticket.ordinal, "draw started");
        Ok(ticket)
    }

    /// Cosmetic: re-sample the displayed candidate. No-op outside `Animating`.
    pub fn resample(&mut self) -> Option<Arc<Entry>> {
        if !matches!(self.state, DrawState::Animating(_)) {
            return None;
        }
        let available = self.pool.available_entries(&self.ledger);
        let pick = self.display_rng.choose(&available).cloned()?;
        self.displayed = Some(Arc::clone(&pick));
        Some(pick)
    }

    /// `Animating → Settling`: resolve the final winner, commit it at `at`,
    /// and advance the tier counters.
    pub fn settle(&mut self, at: DateTime<Utc>) -> Result<Winner, DrawError> {
        let ticket = match self.state {
            DrawState::Animating(t) => t,
            _ => return Err(self.unexpected("settle")),
        };
        let Some(tier) = self.schedule.get(ticket.tier_index).cloned() else {
            self.state = DrawState::Idle;
            return Err(DrawError::ScheduleExhausted);
        };

        let available = self.pool.available_entries(&self.ledger);
        let plan = self.plan.as_ref().filter(|p| p.tier_index == ticket.tier_index);
        let resolved = resolve_winner(
            &available,
            ticket.turn,
            &self.params.overrides,
            plan,
            ticket.ordinal,
            &mut self.rng,
        );
        let Some(Resolved { entry, selection }) = resolved else {
            warn!(turn = ticket.turn, "pool emptied during draw; returning to idle");
            self.state = DrawState::Idle;
            return Err(DrawError::NoEligibleEntries);
        };

        let winner = Winner {
            entry: Arc::clone(&entry),
            tier_index: ticket.tier_index,
            tier_name: tier.name,
            tier_value: tier.value,
            turn: ticket.turn,
            committed_at: at,
        };
        self.ledger.commit(winner.clone());
        self.displayed = Some(entry);
        info!(
            turn = winner.turn,
            tier = %winner.tier_name,
            entry = %winner.entry.id,
            ?selection,
            "winner committed"
        );
        self.last_selection = Some(selection);

        self.drawn_in_tier = ticket.ordinal.saturating_add(1);
        let tier_done = self
            .plan
            .as_ref()
            .map_or(true, |p| p.is_complete(self.drawn_in_tier));
        if tier_done {
            info!(tier = %winner.tier_name, drawn = self.drawn_in_tier, "tier exhausted");
            self.tier_index = ticket.tier_index + 1;
            self.drawn_in_tier = 0;
            self.plan = None;
        }

        self.state = DrawState::Settling { ticket, winner: winner.clone() };
        Ok(winner)
    }

    /// `Settling → Idle`: hand back the committed winner for the reveal.
    pub fn finish(&mut self) -> Result<Winner, DrawError> {
        match std::mem::replace(&mut self.state, DrawState::Idle) {
            DrawState::Settling { winner, .. } => Ok(winner),
            other => {
                self.state = other;
                Err(self.unexpected("finish"))
            }
        }
    }

    /// Clear the ledger and return to the first tier. The pool is untouched.
    pub fn reset_results(&mut self) -> Result<(), DrawError> {
        if self.in_flight() {
            return Err(DrawError::InvalidResetState);
        }
        self.ledger.clear();
        self.tier_index = 0;
        self.drawn_in_tier = 0;
        self.plan = None;
        self.displayed = None;
        self.last_selection = None;
        info!(entries = self.pool.len(), "draw results reset");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        match self.state {
            DrawState::Animating(_) => Phase::Animating,
            DrawState::Settling { .. } => Phase::Settling,
            DrawState::Idle if self.tier_index >= self.schedule.len() => Phase::AllTiersExhausted,
            DrawState::Idle => Phase::Idle,
        }
    }

    pub fn in_flight(&self) -> bool {
        !matches!(self.state, DrawState::Idle)
    }

    pub fn pool(&self) -> &EntryPool {
        &self.pool
    }

    pub fn ledger(&self) -> &WinnerLedger {
        &self.ledger
    }

    pub fn schedule(&self) -> &PrizeSchedule {
        &self.schedule
    }

    pub fn params(&self) -> &DrawParams {
        &self.params
    }

    pub fn tier_index(&self) -> usize {
        self.tier_index
    }

    pub fn drawn_in_tier(&self) -> u32 {
        self.drawn_in_tier
    }

    /// Active allocation plan, if the current tier has been activated.
    pub fn plan(&self) -> Option<&AllocationPlan> {
        self.plan.as_ref()
    }

    pub fn displayed(&self) -> Option<&Arc<Entry>> {
        self.displayed.as_ref()
    }

    pub fn last_selection(&self) -> Option<&Selection> {
        self.last_selection.as_ref()
    }

    pub fn available_count(&self) -> usize {
        self.pool.available_count(&self.ledger)
    }

    /// Quota of the current tier: frozen if active, projected otherwise.
    pub fn current_quota(&self) -> Option<u32> {
        let available = self.pool.available_entries(&self.ledger);
        self.quota_for(self.tier_index, &available)
    }

    /// Prizes left: rest of the current tier plus the projected quota of every later tier.
    pub fn remaining_prizes(&self) -> u32 {
        let available = self.pool.available_entries(&self.ledger);
        (self.tier_index..self.schedule.len())
            .filter_map(|i| self.quota_for(i, &available))
            .enumerate()
            .fold(0u32, |acc, (k, q)| {
                let left = if k == 0 { q.saturating_sub(self.drawn_in_tier) } else { q };
                acc.saturating_add(left)
            })
    }

    /// Quota of every tier in schedule order: completed tiers report what they
    /// drew, the active tier its frozen quota, later tiers their projection.
    pub fn tier_quotas(&self) -> Vec<u32> {
        let available = self.pool.available_entries(&self.ledger);
        (0..self.schedule.len())
            .map(|i| {
                if i < self.tier_index {
                    u32::try_from(self.ledger.count_by_tier_index(i)).unwrap_or(u32::MAX)
                } else {
                    self.quota_for(i, &available).unwrap_or(0)
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let available = self.pool.available_entries(&self.ledger);
        let current_tier = self.schedule.get(self.tier_index).map(|tier| {
            let frozen = self.plan.as_ref().filter(|p| p.tier_index == self.tier_index);
            let quota = frozen.map_or_else(|| effective_quota(tier, &available), |p| p.quota);
            TierStatus {
                index: self.tier_index,
                name: tier.name.clone(),
                value: tier.value.clone(),
                policy: tier.policy,
                quota,
                quota_frozen: frozen.is_some(),
                drawn: self.drawn_in_tier,
                remaining: quota.saturating_sub(self.drawn_in_tier),
            }
        });
        SessionSnapshot {
            phase: self.phase(),
            total_entries: self.pool.len(),
            available_entries: available.len(),
            total_winners: self.ledger.len(),
            current_tier,
            remaining_prizes: self.remaining_prizes(),
            displayed: self.displayed.clone(),
            last_winner: self.ledger.last().cloned(),
            winners: self.ledger.as_slice().to_vec(),
        }
    }

    fn quota_for(&self, tier_index: usize, available: &[Arc<Entry>]) -> Option<u32> {
        let tier = self.schedule.get(tier_index)?;
        match &self.plan {
            Some(p) if p.tier_index == tier_index => Some(p.quota),
            _ => Some(effective_quota(tier, available)),
        }
    }

    fn unexpected(&self, transition: &'static str) -> DrawError {
        DrawError::UnexpectedTransition {
            transition,
            phase: self.phase().as_str(),
        }
    }
}
