//! DrawMachine: single-task driver around a `DrawSession`.
//!
//! The actor task owns the session and three timers:
//! - resample interval (cosmetic candidate updates, published on a watch channel)
//! - settle deadline (`spin` after start; commits the winner)
//! - reveal deadline (`reveal` after settle; emits `WinnerReady`)
//!
//! Commands arrive on a bounded mpsc channel and are answered over oneshot
//! replies. Every state change is serialized through the one task, so a
//! stale timer can never act on a newer draw. Dropping every handle lets the
//! in-flight draw finish before the task returns the session.

use std::future::pending;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use ld_core::{DrawError, Entry, Timing, Winner};

use crate::session::{DrawSession, DrawTicket, SessionSnapshot};

const COMMAND_BUFFER: usize = 32;

/// Notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawEvent {
    Started { turn: u32, tier: String },
    /// Winner written to the ledger (end of spin).
    Committed(Winner),
    /// Reveal delay elapsed; the draw is over and the engine is idle.
    WinnerReady(Winner),
    /// The spin ended without a commit; the engine is idle again.
    Voided,
    ResultsReset,
    EntriesCleared,
}

enum Command {
    Start(oneshot::Sender<Result<DrawTicket, DrawError>>),
    ResetResults(oneshot::Sender<Result<(), DrawError>>),
    ClearAll(oneshot::Sender<Result<(), DrawError>>),
    AddEntry(Entry, oneshot::Sender<Result<Arc<Entry>, DrawError>>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Cloneable handle to a running draw engine.
#[derive(Clone, Debug)]
pub struct DrawMachine {
    commands: mpsc::Sender<Command>,
    candidate: watch::Receiver<Option<Arc<Entry>>>,
}

/// Result of `DrawMachine::spawn`.
pub struct Spawned {
    pub machine: DrawMachine,
    pub events: mpsc::UnboundedReceiver<DrawEvent>,
    /// Resolves to the session once every handle is dropped and no draw is in flight.
    pub task: JoinHandle<DrawSession>,
}

impl DrawMachine {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(session: DrawSession) -> Spawned {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (candidate_tx, candidate_rx) = watch::channel(session.displayed().cloned());

        let actor = Actor {
            timing: session.params().timing,
            session,
            commands: cmd_rx,
            events: event_tx,
            candidate: candidate_tx,
        };
        let task = tokio::spawn(actor.run());

        Spawned {
            machine: DrawMachine {
                commands: cmd_tx,
                candidate: candidate_rx,
            },
            events: event_rx,
            task,
        }
    }

    pub async fn start(&self) -> Result<DrawTicket, DrawError> {
        self.request(Command::Start).await?
    }

    pub async fn reset_results(&self) -> Result<(), DrawError> {
        self.request(Command::ResetResults).await?
    }

    pub async fn clear_all(&self) -> Result<(), DrawError> {
        self.request(Command::ClearAll).await?
    }

    pub async fn add_entry(&self, entry: Entry) -> Result<Arc<Entry>, DrawError> {
        self.request(|reply| Command::AddEntry(entry, reply)).await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, DrawError> {
        self.request(Command::Snapshot).await
    }

    /// Currently displayed candidate (changes on every resample tick).
    pub fn candidate(&self) -> watch::Receiver<Option<Arc<Entry>>> {
        self.candidate.clone()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DrawError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| DrawError::EngineStopped)?;
        rx.await.map_err(|_| DrawError::EngineStopped)
    }
}

// ------------------------------------------------------------------
// Actor
// ------------------------------------------------------------------

struct Actor {
    session: DrawSession,
    timing: Timing,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<DrawEvent>,
    candidate: watch::Sender<Option<Arc<Entry>>>,
}

impl Actor {
    async fn run(mut self) -> DrawSession {
        let mut ticker: Option<Interval> = None;
        let mut settle_at: Option<Instant> = None;
        let mut reveal_at: Option<Instant> = None;
        let mut open = true;

        debug!(entries = self.session.pool().len(), "draw engine started");
        loop {
            if !open && !self.session.in_flight() {
                break;
            }
            tokio::select! {
                cmd = recv_command(&mut self.commands, open) => match cmd {
                    Some(cmd) => {
                        if self.handle(cmd) {
                            let now = Instant::now();
                            let mut iv = time::interval_at(now + self.timing.resample, self.timing.resample);
                            iv.set_missed_tick_behavior(MissedTickBehavior::Skip);
                            ticker = Some(iv);
                            settle_at = Some(now + self.timing.spin);
                        }
                    }
                    None => {
                        debug!("all handles dropped");
                        open = false;
                    }
                },
                _ = next_tick(&mut ticker) => {
                    if let Some(pick) = self.session.resample() {
                        self.candidate.send_replace(Some(pick));
                    }
                }
                _ = deadline(settle_at) => {
                    settle_at = None;
                    ticker = None;
                    if self.settle() {
                        reveal_at = Some(Instant::now() + self.timing.reveal);
                    }
                }
                _ = deadline(reveal_at) => {
                    reveal_at = None;
                    self.reveal();
                }
            }
        }
        debug!(winners = self.session.ledger().len(), "draw engine stopped");
        self.session
    }

    /// Returns `true` when a draw was started and the timers must be armed.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start(reply) => {
                let result = self.session.start();
                let started = result.is_ok();
                if let Ok(ticket) = &result {
                    let tier = self
                        .session
                        .schedule()
                        .get(ticket.tier_index)
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    self.candidate.send_replace(self.session.displayed().cloned());
                    self.emit(DrawEvent::Started { turn: ticket.turn, tier });
                }
                let _ = reply.send(result);
                started
            }
            Command::ResetResults(reply) => {
                let result = self.session.reset_results();
                if result.is_ok() {
                    self.candidate.send_replace(None);
                    self.emit(DrawEvent::ResultsReset);
                }
                let _ = reply.send(result);
                false
            }
            Command::ClearAll(reply) => {
                let result = self.session.clear_all();
                if result.is_ok() {
                    self.candidate.send_replace(None);
                    self.emit(DrawEvent::EntriesCleared);
                }
                let _ = reply.send(result);
                false
            }
            Command::AddEntry(entry, reply) => {
                let _ = reply.send(self.session.add_entry(entry));
                false
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
                false
            }
        }
    }

    fn settle(&mut self) -> bool {
        match self.session.settle(Utc::now()) {
            Ok(winner) => {
                self.candidate.send_replace(Some(Arc::clone(&winner.entry)));
                self.emit(DrawEvent::Committed(winner));
                true
            }
            Err(e) => {
                warn!(error = %e, "settle declined");
                self.candidate.send_replace(None);
                self.emit(DrawEvent::Voided);
                false
            }
        }
    }

    fn reveal(&mut self) {
        match self.session.finish() {
            Ok(winner) => {
                info!(turn = winner.turn, entry = %winner.entry.id, "winner revealed");
                self.emit(DrawEvent::WinnerReady(winner));
            }
            Err(e) => warn!(error = %e, "reveal declined"),
        }
    }

    fn emit(&self, event: DrawEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

async fn recv_command(rx: &mut mpsc::Receiver<Command>, open: bool) -> Option<Command> {
    if open {
        rx.recv().await
    } else {
        pending().await
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => pending().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => time::sleep_until(at).await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ld_algo::{EntryPool, PrizeSchedule};
    use ld_core::{DrawParams, EntryId, PrizeTier, RegionTag};

    use crate::session::Phase;

    fn pool(n: usize) -> EntryPool {
        EntryPool::from_entries((0..n).map(|i| {
            let region = if i % 2 == 0 { "North" } else { "South" };
            Entry::new(EntryId::new(format!("INV{:03}", i + 1)).unwrap(), "Khách", "0900000000")
                .with_region(RegionTag::new(region).unwrap())
        }))
        .unwrap()
    }

    fn session(n: usize) -> DrawSession {
        let schedule = PrizeSchedule::new(vec![
            PrizeTier::flat("Giải Nhất", "5.000.000đ", 2).unwrap(),
            PrizeTier::per_region("Giải Nhì", "3.000.000đ", 3, 1).unwrap(),
        ])
        .unwrap();
        let params = DrawParams { seed: Some(11), ..DrawParams::default() };
        DrawSession::with_pool(pool(n), schedule, params)
    }

    async fn next_ready(events: &mut mpsc::UnboundedReceiver<DrawEvent>) -> Winner {
        loop {
            match events.recv().await {
                Some(DrawEvent::WinnerReady(w)) => return w,
                Some(_) => continue,
                None => panic!("event stream closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_whole_schedule_with_timers() {
        let Spawned { machine, mut events, task } = DrawMachine::spawn(session(10));
        let began = Instant::now();

        let mut winners = Vec::new();
        while machine.start().await.is_ok() {
            winners.push(next_ready(&mut events).await);
        }
        assert_eq!(winners.len(), 4);
        assert_eq!(machine.start().await.unwrap_err(), DrawError::ScheduleExhausted);
        assert!(began.elapsed() >= Duration::from_millis(4 * 7_400));

        let turns: Vec<u32> = winners.iter().map(|w| w.turn).collect();
        assert_eq!(turns, vec![1, 2, 3, 4]);

        drop(machine);
        let session = task.await.unwrap();
        assert_eq!(session.phase(), Phase::AllTiersExhausted);
        assert_eq!(session.ledger().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn event_order_for_one_draw() {
        let Spawned { machine, mut events, .. } = DrawMachine::spawn(session(4));
        let ticket = machine.start().await.unwrap();
        assert_eq!(
            events.recv().await,
            Some(DrawEvent::Started { turn: ticket.turn, tier: "Giải Nhất".into() })
        );
        let committed = match events.recv().await {
            Some(DrawEvent::Committed(w)) => w,
            other => panic!("unexpected event {other:?}"),
        };
        assert_eq!(events.recv().await, Some(DrawEvent::WinnerReady(committed)));
    }

    #[tokio::test(start_paused = true)]
    async fn commands_declined_mid_draw() {
        let Spawned { machine, mut events, .. } = DrawMachine::spawn(session(6));
        machine.start().await.unwrap();

        assert_eq!(machine.start().await.unwrap_err(), DrawError::DrawInProgress);
        assert_eq!(machine.reset_results().await.unwrap_err(), DrawError::InvalidResetState);
        assert_eq!(machine.clear_all().await.unwrap_err(), DrawError::InvalidResetState);
        let late = Entry::new(EntryId::new("LATE").unwrap(), "Late", "0900000000");
        assert_eq!(machine.add_entry(late.clone()).await.unwrap_err(), DrawError::DrawInProgress);

        let snap = machine.snapshot().await.unwrap();
        assert_eq!(snap.phase, Phase::Animating);
        assert_eq!(snap.total_winners, 0);

        next_ready(&mut events).await;
        assert!(machine.add_entry(late).await.is_ok());
        machine.reset_results().await.unwrap();
        assert_eq!(events.recv().await, Some(DrawEvent::ResultsReset));
        let snap = machine.snapshot().await.unwrap();
        assert_eq!(snap.total_entries, 7);
        assert_eq!(snap.total_winners, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn candidate_updates_while_spinning() {
        let Spawned { machine, mut events, .. } = DrawMachine::spawn(session(10));
        let mut candidate = machine.candidate();
        assert!(candidate.borrow().is_none());

        machine.start().await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert!(candidate.borrow_and_update().is_some());

        let winner = next_ready(&mut events).await;
        let shown = candidate.borrow().clone().unwrap();
        assert_eq!(shown.id, winner.entry.id);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handles_finish_in_flight_draw() {
        let Spawned { machine, mut events, task } = DrawMachine::spawn(session(5));
        machine.start().await.unwrap();
        drop(machine);

        let session = task.await.unwrap();
        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.phase(), Phase::Idle);
        next_ready(&mut events).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_engine_reports_engine_stopped() {
        let Spawned { machine, task, .. } = DrawMachine::spawn(session(3));
        task.abort();
        let _ = task.await;
        assert_eq!(machine.start().await.unwrap_err(), DrawError::EngineStopped);
        assert_eq!(machine.snapshot().await.unwrap_err(), DrawError::EngineStopped);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_empties_pool() {
        let Spawned { machine, mut events, .. } = DrawMachine::spawn(session(3));
        machine.clear_all().await.unwrap();
        assert_eq!(events.recv().await, Some(DrawEvent::EntriesCleared));
        assert_eq!(machine.start().await.unwrap_err(), DrawError::NoEligibleEntries);
    }
}
