//! Lifecycle transition tables
//!
//! Every status enum the engines mutate implements [`Lifecycle`]. Engines go
//! through [`validate_transition`] before writing a new status; resets bypass
//! the tables and write the initial state directly.

use crate::error::TransitionError;
use crate::types::{AgentStatus, ParticipantStatus, StageStatus, WarRoomPhase};
use std::fmt::Debug;

/// A status with a fixed transition table
pub trait Lifecycle: Copy + Eq + Debug + 'static {
    /// Every state, table order
    const ALL: &'static [Self];

    /// States reachable in one step from `self`
    fn allowed_transitions(self) -> &'static [Self];

    /// Lower-case name for errors and logs
    fn label(self) -> &'static str;
}

/// Check one edge against the table
///
/// # Errors
/// `TransitionError::IllegalTransition` if `to` is not reachable from `from`.
pub fn validate_transition<S: Lifecycle>(from: S, to: S) -> Result<(), TransitionError> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::IllegalTransition {
            from: from.label(),
            to: to.label(),
        })
    }
}

/// Whether `state` has no outgoing edges
#[must_use]
pub fn is_terminal<S: Lifecycle>(state: S) -> bool {
    state.allowed_transitions().is_empty()
}

impl Lifecycle for WarRoomPhase {
    const ALL: &'static [Self] = &[Self::Idle, Self::Open, Self::Assembling, Self::Active];

    fn allowed_transitions(self) -> &'static [Self] {
        use WarRoomPhase::{Active, Assembling, Idle, Open};
        match self {
            Idle => &[Open],
            Open => &[Assembling, Idle],
            Assembling => &[Active, Idle],
            Active => &[Idle],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::Assembling => "assembling",
            Self::Active => "active",
        }
    }
}

impl Lifecycle for ParticipantStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Calling, Self::Joining, Self::Joined];

    fn allowed_transitions(self) -> &'static [Self] {
        use ParticipantStatus::{Calling, Joined, Joining, Pending};
        match self {
            Pending => &[Calling],
            Calling => &[Joining],
            Joining => &[Joined],
            Joined => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Calling => "calling",
            Self::Joining => "joining",
            Self::Joined => "joined",
        }
    }
}

impl Lifecycle for StageStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Running, Self::Completed];

    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Running],
            Self::Running => &[Self::Completed],
            Self::Completed => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl Lifecycle for AgentStatus {
    const ALL: &'static [Self] = &[Self::Idle, Self::Active, Self::Completed];

    // Agents are revisited within one run: completed -> active is legal.
    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Idle | Self::Completed => &[Self::Active],
            Self::Active => &[Self::Completed],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}
