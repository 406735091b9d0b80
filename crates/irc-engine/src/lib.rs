//! IRC Engine - war-room orchestration
//!
//! Timed, cancellable engines behind an incident detail view:
//! 1. **War room**: calls the bridge roster and runs the assembly clock
//! 2. **Simulation**: six-stage pipeline over selected strategies
//! 3. **Execution**: scripted agent tasks ending in impact metrics
//!
//! The [`IncidentDetailController`] owns all three for one alert.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use irc_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(AlertCatalog::builtin()?);
//! let ctrl = IncidentDetailController::new(catalog, EngineConfig::default(), "INC-2024-001")?;
//!
//! ctrl.initiate_war_room()?;
//! ctrl.assemble_bridge()?;
//! ctrl.war_room().wait_for_phase(WarRoomPhase::Active).await;
//!
//! for text in ctrl.war_room_candidates().iter().take(2) {
//!     ctrl.toggle_strategy(text)?;
//! }
//! ctrl.simulate().await?;
//! ctrl.end_war_room()?;
//! let metrics = ctrl.execute_strategies().await?;
//! ```

pub mod controller;
pub mod error;
pub mod execution;
pub mod logging;
pub mod scheduler;
pub mod simulation;
pub mod state_machine;
pub mod types;
pub mod war_room;

pub use controller::{DeepDive, IncidentDetailController, ViewState};
pub use error::{EngineError, TransitionError, ValidationError};
pub use execution::{
    ExecutionAgent, ExecutionEngine, ExecutionEvent, ExecutionSnapshot, ImpactMetrics,
    ResolutionComparison, ResolutionProfile,
};
pub use simulation::{
    RiskLevel, SimulationEngine, SimulationResult, SimulationSnapshot, SimulationStep,
    StrategyOutcome,
};
pub use types::*;
pub use war_room::{Participant, WarRoomCommand, WarRoomEngine, WarRoomSnapshot};

/// Common imports
pub mod prelude {
    pub use crate::controller::{IncidentDetailController, ViewState};
    pub use crate::error::{EngineError, ValidationError};
    pub use crate::execution::{ExecutionEngine, ExecutionEvent, ImpactMetrics};
    pub use crate::simulation::{SimulationEngine, SimulationResult};
    pub use crate::types::{EngineConfig, Notice, Tab, WarRoomPhase};
    pub use crate::war_room::{WarRoomCommand, WarRoomEngine};
    pub use irc_catalog::{AlertCatalog, IncidentAlert, StrategyDetails};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
