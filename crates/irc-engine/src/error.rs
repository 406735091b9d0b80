//! Error types for the war-room engines
//!
//! Three classes:
//! - User input rejected by a precondition ([`ValidationError`])
//! - A lifecycle edge the transition tables forbid ([`TransitionError`])
//! - A run interrupted by reset ([`EngineError::Cancelled`])

use irc_catalog::CatalogError;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Action rejected by a precondition; state is unchanged
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Illegal lifecycle transition
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Catalog load or lookup failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Run was overtaken by a reset
    #[error("run cancelled by reset")]
    Cancelled,
}

impl EngineError {
    /// Whether the error should be shown to the operator as a notice
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Catalog(CatalogError::AlertNotFound(_))
        )
    }

    /// Whether the error only reports a stale run
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Rejected user actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Initiate while the bridge is assembling or live
    #[error("War Room is already in progress")]
    WarRoomInProgress,

    /// Assemble before the war room was opened, or twice
    #[error("War Room must be open and idle to assemble the bridge")]
    WarRoomNotOpen,

    /// End / reset / minimize before the war room was ever initiated
    #[error("War Room has not been initiated")]
    WarRoomNotInitiated,

    /// Simulate with an empty selection
    #[error("Please select at least one strategy to simulate")]
    NoStrategiesSelected,

    /// Simulate while a simulation is running
    #[error("A simulation is already running")]
    SimulationRunning,

    /// Execute without war-room results
    #[error("Run a War Room simulation before executing strategies")]
    NoWarRoomResults,

    /// Execute while an execution is running
    #[error("Strategy execution is already running")]
    ExecutionRunning,

    /// Strategy text is not a recommendation of the displayed alert
    #[error("not a recommendation for this alert: {0:?}")]
    UnknownStrategy(String),
}

/// Lifecycle transition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Edge missing from the transition table
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition {
        /// Source state
        from: &'static str,
        /// Requested state
        to: &'static str,
    },
}
