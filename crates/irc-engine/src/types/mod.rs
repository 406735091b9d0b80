//! Shared engine types
//!
//! - Run identifiers
//! - Lifecycle status enums driven by the transition tables
//! - View-level enums (tabs, notices)

mod config;

pub use config::{EngineConfig, TimingConfig, MAX_TIME_SCALE, MIN_TIME_SCALE};

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique id for one simulation or execution run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate a new run id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// War-room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarRoomPhase {
    /// Nothing initiated
    #[default]
    Idle,
    /// Coordination view open, bridge not yet assembling
    Open,
    /// Calling sequence in flight
    Assembling,
    /// Everyone joined; the assembly clock is running
    Active,
}

/// Participant call status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Not yet called
    #[default]
    Pending,
    /// Phone ringing
    Calling,
    /// Picked up, connecting
    Joining,
    /// On the bridge
    Joined,
}

/// Participant group; approval chain is called first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantType {
    /// Approval chain
    Approval,
    /// Stakeholder coordination
    Coordination,
}

/// Simulation stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[allow(missing_docs)]
    #[default]
    Pending,
    #[allow(missing_docs)]
    Running,
    #[allow(missing_docs)]
    Completed,
}

/// Execution agent status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Not yet used in this run
    #[default]
    Idle,
    /// Working a task
    Active,
    /// Finished its latest task
    Completed,
}

/// Detail view tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Alert overview
    #[default]
    Overview,
    /// AI recommendations
    Ai,
    /// Decision support and war-room results
    Decision,
    /// Live execution
    Execution,
    /// Impact metrics
    Impact,
}

/// Severity of an operator notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    #[allow(missing_docs)]
    Info,
    #[allow(missing_docs)]
    Success,
    #[allow(missing_docs)]
    Error,
}

/// A transient operator notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Level
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    /// Informational notice
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
        assert!(RunId::new().to_string().starts_with("run-"));
    }

    #[test]
    fn tab_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tab::Execution).unwrap(), "\"execution\"");
    }

    #[test]
    fn notice_display_carries_level() {
        assert_eq!(Notice::error("nope").to_string(), "[error] nope");
    }
}
