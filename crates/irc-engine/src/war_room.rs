//! War-room bridge assembly
//!
//! Lifecycle: `idle -> open -> assembling -> active`, and back to `idle` on
//! reset from anywhere.
//! - Participants are called approval chain first, then coordination, one
//!   at a time in roster order
//! - Every status change is written to the event log
//! - Once everyone has joined, the assembly clock ticks once per interval
//!
//! The engine knows nothing about dialogs; minimizing a view leaves its
//! timers running.

use crate::error::{EngineError, ValidationError};
use crate::logging::{EventLog, LogEntry};
use crate::scheduler::{Scheduler, Ticket};
use crate::state_machine::validate_transition;
use crate::types::{
    EngineConfig, ParticipantStatus, ParticipantType, TimingConfig, WarRoomPhase,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

const ROSTER: [(&str, &str, &str, ParticipantType); 7] = [
    ("approver-1", "Alex Chen", "Senior DevOps Engineer", ParticipantType::Approval),
    ("approver-2", "Sarah Mitchell", "Director of Operations", ParticipantType::Approval),
    ("approver-3", "Michael Torres", "VP of Infrastructure", ParticipantType::Approval),
    ("coord-1", "David Kim", "Engineering Lead", ParticipantType::Coordination),
    ("coord-2", "Emily Watson", "Customer Success Lead", ParticipantType::Coordination),
    ("coord-3", "Robert Chen", "Finance Lead", ParticipantType::Coordination),
    ("coord-4", "Lisa Park", "Security Lead", ParticipantType::Coordination),
];

/// A bridge participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Roster id
    pub id: String,
    /// Display name
    pub name: String,
    /// Job title
    pub role: String,
    /// Group
    #[serde(rename = "type")]
    pub kind: ParticipantType,
    /// Call status
    pub status: ParticipantStatus,
}

/// The fixed roster, everyone pending
#[must_use]
pub fn roster() -> Vec<Participant> {
    ROSTER
        .iter()
        .map(|&(id, name, role, kind)| Participant {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            kind,
            status: ParticipantStatus::Pending,
        })
        .collect()
}

/// Commands accepted by [`WarRoomEngine::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarRoomCommand {
    /// Open the coordination view
    Initiate,
    /// Start calling the roster
    StartCallingSequence,
    /// Cancel timers and return to idle
    Reset,
}

/// Point-in-time copy of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarRoomSnapshot {
    /// Lifecycle phase
    pub phase: WarRoomPhase,
    /// Roster with live statuses
    pub participants: Vec<Participant>,
    /// Whole seconds since the bridge went live
    pub assembly_time: u64,
    /// Event log, oldest first
    pub log: Vec<LogEntry>,
}

impl WarRoomSnapshot {
    /// Calling sequence in flight
    #[inline]
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.phase == WarRoomPhase::Assembling
    }

    /// Bridge is live
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == WarRoomPhase::Active
    }

    /// Participants on the bridge
    #[must_use]
    pub fn joined_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.status == ParticipantStatus::Joined)
            .count()
    }
}

#[derive(Debug)]
struct WarRoomState {
    phase: WarRoomPhase,
    participants: Vec<Participant>,
    assembly_time: u64,
    log: EventLog,
}

impl WarRoomState {
    fn fresh() -> Self {
        Self {
            phase: WarRoomPhase::Idle,
            participants: roster(),
            assembly_time: 0,
            log: EventLog::new(),
        }
    }

    fn advance_participant(
        &mut self,
        idx: usize,
        to: ParticipantStatus,
    ) -> Result<(), EngineError> {
        let participant = &mut self.participants[idx];
        validate_transition(participant.status, to)?;
        participant.status = to;
        let message = match to {
            ParticipantStatus::Calling => format!("{} is being called", participant.name),
            ParticipantStatus::Joining => format!("{} is joining the bridge", participant.name),
            ParticipantStatus::Joined => format!("{} joined the bridge", participant.name),
            ParticipantStatus::Pending => return Ok(()),
        };
        tracing::debug!(participant = %participant.id, status = ?to, "participant status");
        self.log.append(message);
        Ok(())
    }

    fn snapshot(&self) -> WarRoomSnapshot {
        WarRoomSnapshot {
            phase: self.phase,
            participants: self.participants.clone(),
            assembly_time: self.assembly_time,
            log: self.log.entries().to_vec(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<WarRoomState>,
    scheduler: Scheduler,
    timing: TimingConfig,
    phase_tx: watch::Sender<WarRoomPhase>,
}

impl Inner {
    /// Run `f` under the state lock if `ticket` is still current
    fn apply<R>(
        &self,
        ticket: Ticket,
        f: impl FnOnce(&mut WarRoomState) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut state = self.state.lock();
        if !self.scheduler.is_current(ticket) {
            tracing::trace!(generation = ticket.generation(), "stale war-room continuation");
            return Err(EngineError::Cancelled);
        }
        f(&mut state)
    }
}

/// Cloneable handle to one war-room session
#[derive(Debug, Clone)]
pub struct WarRoomEngine {
    inner: Arc<Inner>,
}

impl WarRoomEngine {
    /// New idle session
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let (phase_tx, _) = watch::channel(WarRoomPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(WarRoomState::fresh()),
                scheduler: Scheduler::new(config.effective_time_scale()),
                timing: config.timing,
                phase_tx,
            }),
        }
    }

    /// Apply a command
    ///
    /// # Errors
    /// As for [`Self::start_calling_sequence`].
    pub fn dispatch(&self, command: WarRoomCommand) -> Result<(), EngineError> {
        match command {
            WarRoomCommand::Initiate => {
                self.initiate();
                Ok(())
            }
            WarRoomCommand::StartCallingSequence => self.start_calling_sequence(),
            WarRoomCommand::Reset => {
                self.reset_state();
                Ok(())
            }
        }
    }

    /// Open the coordination view. Returns `false` (no-op) unless idle.
    pub fn initiate(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            if state.phase != WarRoomPhase::Idle {
                tracing::debug!(phase = ?state.phase, "initiate ignored");
                return false;
            }
            state.phase = WarRoomPhase::Open;
        }
        self.inner.phase_tx.send_replace(WarRoomPhase::Open);
        tracing::info!("war room opened");
        true
    }

    /// Begin calling the roster in the background
    ///
    /// # Errors
    /// - `ValidationError::WarRoomNotOpen` when idle
    /// - `ValidationError::WarRoomInProgress` when already assembling or live
    pub fn start_calling_sequence(&self) -> Result<(), EngineError> {
        let ticket = {
            let mut state = self.inner.state.lock();
            match state.phase {
                WarRoomPhase::Open => {}
                WarRoomPhase::Idle => return Err(ValidationError::WarRoomNotOpen.into()),
                WarRoomPhase::Assembling | WarRoomPhase::Active => {
                    return Err(ValidationError::WarRoomInProgress.into())
                }
            }
            validate_transition(state.phase, WarRoomPhase::Assembling)?;
            state.phase = WarRoomPhase::Assembling;
            self.inner.scheduler.ticket()
        };
        self.inner.phase_tx.send_replace(WarRoomPhase::Assembling);
        tracing::info!("bridge assembly started");

        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.spawn(async move {
            if let Err(err) = run_assembly(weak, ticket).await {
                tracing::trace!(%err, "assembly task ended");
            }
        });
        Ok(())
    }

    /// Cancel every timer and return to a fresh idle session
    pub fn reset_state(&self) {
        {
            let mut state = self.inner.state.lock();
            let pending = self.inner.scheduler.pending_tasks();
            let generation = self.inner.scheduler.cancel_all();
            *state = WarRoomState::fresh();
            tracing::info!(generation, pending, "war room reset");
        }
        self.inner.phase_tx.send_replace(WarRoomPhase::Idle);
    }

    /// Copy of the current session
    #[must_use]
    pub fn snapshot(&self) -> WarRoomSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> WarRoomPhase {
        self.inner.state.lock().phase
    }

    /// Seconds since the bridge went live
    #[must_use]
    pub fn assembly_time(&self) -> u64 {
        self.inner.state.lock().assembly_time
    }

    /// Watch phase changes
    #[must_use]
    pub fn subscribe_phase(&self) -> watch::Receiver<WarRoomPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Resolve once the session reaches `phase`
    pub async fn wait_for_phase(&self, phase: WarRoomPhase) {
        let mut rx = self.subscribe_phase();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = rx.wait_for(|p| *p == phase).await;
    }
}

fn upgrade(weak: &Weak<Inner>) -> Result<Arc<Inner>, EngineError> {
    weak.upgrade().ok_or(EngineError::Cancelled)
}

async fn pause(weak: &Weak<Inner>, ticket: Ticket, duration: Duration) -> Result<(), EngineError> {
    let inner = upgrade(weak)?;
    inner.scheduler.delay(ticket, duration).await
}

fn advance(
    weak: &Weak<Inner>,
    ticket: Ticket,
    idx: usize,
    to: ParticipantStatus,
) -> Result<(), EngineError> {
    upgrade(weak)?.apply(ticket, |state| state.advance_participant(idx, to))
}

async fn run_assembly(weak: Weak<Inner>, ticket: Ticket) -> Result<(), EngineError> {
    let (order, timing) = {
        let inner = upgrade(&weak)?;
        let state = inner.state.lock();
        let mut order: Vec<usize> = (0..state.participants.len()).collect();
        order.sort_by_key(|&idx| state.participants[idx].kind);
        (order, inner.timing)
    };

    for idx in order {
        advance(&weak, ticket, idx, ParticipantStatus::Calling)?;
        pause(&weak, ticket, timing.calling_delay()).await?;
        advance(&weak, ticket, idx, ParticipantStatus::Joining)?;
        pause(&weak, ticket, timing.joining_delay()).await?;
        advance(&weak, ticket, idx, ParticipantStatus::Joined)?;
    }

    {
        let inner = upgrade(&weak)?;
        inner.apply(ticket, |state| {
            validate_transition(state.phase, WarRoomPhase::Active)?;
            state.phase = WarRoomPhase::Active;
            Ok(())
        })?;
        inner.phase_tx.send_replace(WarRoomPhase::Active);
        tracing::info!("bridge assembled; war room active");
    }

    loop {
        pause(&weak, ticket, timing.tick_interval()).await?;
        upgrade(&weak)?.apply(ticket, |state| {
            state.assembly_time += 1;
            Ok(())
        })?;
    }
}
