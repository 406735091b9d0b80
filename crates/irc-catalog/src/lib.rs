//! IRC Catalog - incident records and strategy details
//!
//! Read-only data the war-room engines work from:
//! - Incident alerts with per-phase narrative, workflow and regional data
//! - The strategy table behind every AI recommendation text
//! - Dashboard counts
//!
//! # Example
//!
//! ```rust
//! use irc_catalog::AlertCatalog;
//!
//! let catalog = AlertCatalog::builtin().unwrap();
//! let alert = catalog.get("INC-2024-001").unwrap();
//! let details = catalog.strategy_details(&alert.recommendations()[0]);
//! assert_eq!(details.confidence, 94.7);
//! ```

pub mod catalog;
pub mod error;
pub mod strategy;
pub mod types;

pub use catalog::{AlertCatalog, DashboardSummary};
pub use error::CatalogError;
pub use strategy::{StrategyDetails, StrategyEntry, StrategyId, StrategyTable, DEFAULT_CONFIDENCE};
pub use types::{
    ActionDetail, AlertDetails, AlertId, AlertStatus, DecisionDetail, DetectionDetail,
    IncidentAlert, IncidentPhase, RegionalImpact, ResolutionDetail, ScenarioRisk, Severity,
    SimulationScenario, SituationDetail, WorkflowStatus, WorkflowStep,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the catalog
    pub use crate::{
        AlertCatalog, AlertId, CatalogError, IncidentAlert, Severity, StrategyDetails,
        StrategyTable,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
