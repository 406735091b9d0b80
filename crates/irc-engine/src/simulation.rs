//! Strategy simulation
//!
//! Runs a fixed six-stage pipeline over the selected recommendations, then
//! aggregates their resolved confidences into a [`SimulationResult`]. One
//! run at a time per engine; a new run replaces the previous result.

use crate::error::{EngineError, ValidationError};
use crate::scheduler::{RunGuard, Scheduler, Ticket};
use crate::state_machine::validate_transition;
use crate::types::{EngineConfig, RunId, StageStatus};
use irc_catalog::AlertCatalog;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pipeline stages and their durations in milliseconds
pub const STAGES: [(&str, u64); 6] = [
    ("Analyzing selected strategies", 1000),
    ("Building simulation environment", 1200),
    ("Executing strategy combinations", 1500),
    ("Calculating impact projections", 1000),
    ("Validating resolution paths", 800),
    ("Generating final report", 600),
];

/// Reported estimated resolution time
pub const ESTIMATED_TIME: &str = "12 minutes";

/// Reported recovery rate
pub const RECOVERY_RATE: &str = "97.3%";

/// One pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// 1-based position
    pub id: usize,
    /// Display name
    pub name: String,
    /// Unscaled duration
    pub duration_ms: u64,
    /// Status
    pub status: StageStatus,
}

fn fresh_steps() -> Vec<SimulationStep> {
    STAGES
        .iter()
        .enumerate()
        .map(|(idx, &(name, duration_ms))| SimulationStep {
            id: idx + 1,
            name: name.to_string(),
            duration_ms,
            status: StageStatus::Pending,
        })
        .collect()
}

/// Risk band derived from mean confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Mean above 92
    Low,
    /// Mean above 85
    Medium,
    /// Everything else
    High,
}

impl RiskLevel {
    /// Band for a mean confidence
    #[must_use]
    pub fn from_confidence(mean: f64) -> Self {
        if mean > 92.0 {
            Self::Low
        } else if mean > 85.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// Per-strategy line of the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    /// Strategy title
    pub title: String,
    /// Expected impact
    pub estimated_impact: String,
    /// Confidence, percent
    pub confidence: f64,
}

/// Aggregate result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Run that produced it
    pub run_id: RunId,
    /// Mean confidence of the selection
    pub success_probability: f64,
    /// Estimated resolution time
    pub estimated_time: String,
    /// Projected recovery rate
    pub recovery_rate: String,
    /// Risk band
    pub risk_level: RiskLevel,
    /// Breakdown, selection order
    pub strategies: Vec<StrategyOutcome>,
}

impl SimulationResult {
    /// Aggregate a selection against the strategy table
    #[must_use]
    pub fn compute(catalog: &AlertCatalog, selected: &[String]) -> Self {
        let strategies: Vec<StrategyOutcome> = selected
            .iter()
            .map(|text| {
                let details = catalog.strategy_details(text);
                StrategyOutcome {
                    title: details.title.clone(),
                    estimated_impact: details.estimated_impact.clone(),
                    confidence: details.confidence,
                }
            })
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = if strategies.is_empty() {
            0.0
        } else {
            strategies.iter().map(|s| s.confidence).sum::<f64>() / strategies.len() as f64
        };
        Self {
            run_id: RunId::new(),
            success_probability: mean,
            estimated_time: ESTIMATED_TIME.to_string(),
            recovery_rate: RECOVERY_RATE.to_string(),
            risk_level: RiskLevel::from_confidence(mean),
            strategies,
        }
    }
}

/// Point-in-time copy of the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// A run is in flight
    pub is_running: bool,
    /// Strategies of the current or last run
    pub selected: Vec<String>,
    /// Pipeline stages; empty before the first run
    pub steps: Vec<SimulationStep>,
    /// Result of the last completed run
    pub result: Option<SimulationResult>,
}

impl SimulationSnapshot {
    /// Stage currently running, if any
    #[must_use]
    pub fn running_step(&self) -> Option<&SimulationStep> {
        self.steps.iter().find(|s| s.status == StageStatus::Running)
    }
}

#[derive(Debug, Default)]
struct SimulationState {
    is_running: bool,
    selected: Vec<String>,
    steps: Vec<SimulationStep>,
    result: Option<SimulationResult>,
}

impl SimulationState {
    fn abandon(&mut self) {
        *self = Self::default();
    }

    fn set_stage(&mut self, idx: usize, to: StageStatus) -> Result<(), EngineError> {
        let step = &mut self.steps[idx];
        validate_transition(step.status, to)?;
        step.status = to;
        tracing::debug!(stage = %step.name, status = ?to, "simulation stage");
        Ok(())
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<SimulationState>,
    scheduler: Scheduler,
    catalog: Arc<AlertCatalog>,
}

impl Inner {
    fn apply<R>(
        &self,
        ticket: Ticket,
        f: impl FnOnce(&mut SimulationState) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut state = self.state.lock();
        if !self.scheduler.is_current(ticket) {
            tracing::trace!(generation = ticket.generation(), "stale simulation continuation");
            return Err(EngineError::Cancelled);
        }
        f(&mut state)
    }
}

/// Cloneable handle to the simulation engine
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    inner: Arc<Inner>,
}

impl SimulationEngine {
    /// New engine resolving strategies through `catalog`
    #[must_use]
    pub fn new(catalog: Arc<AlertCatalog>, config: &EngineConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SimulationState::default()),
                scheduler: Scheduler::new(config.effective_time_scale()),
                catalog,
            }),
        }
    }

    /// Run the pipeline over `selected` and store the result
    ///
    /// # Errors
    /// As for [`Self::start`] and [`SimulationRun::complete`].
    pub async fn simulate(&self, selected: Vec<String>) -> Result<SimulationResult, EngineError> {
        self.start(selected)?.complete().await
    }

    /// Accept a run over `selected` without advancing it
    ///
    /// The engine is marked running until the returned run completes, is
    /// dropped, or a reset overtakes it.
    ///
    /// # Errors
    /// - `ValidationError::NoStrategiesSelected` for an empty selection
    /// - `ValidationError::SimulationRunning` while another run is in flight
    pub fn start(&self, selected: Vec<String>) -> Result<SimulationRun<'_>, EngineError> {
        if selected.is_empty() {
            return Err(ValidationError::NoStrategiesSelected.into());
        }
        let ticket = {
            let mut state = self.inner.state.lock();
            if state.is_running {
                return Err(ValidationError::SimulationRunning.into());
            }
            *state = SimulationState {
                is_running: true,
                selected: selected.clone(),
                steps: fresh_steps(),
                result: None,
            };
            self.inner.scheduler.ticket()
        };
        tracing::info!(strategies = selected.len(), "simulation started");
        Ok(SimulationRun {
            inner: &self.inner,
            guard: RunGuard::new(
                &self.inner.state,
                &self.inner.scheduler,
                ticket,
                SimulationState::abandon,
            ),
            selected,
        })
    }

    /// Cancel any run and discard steps, selection and result
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        self.inner.scheduler.cancel_all();
        *state = SimulationState::default();
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        let state = self.inner.state.lock();
        SimulationSnapshot {
            is_running: state.is_running,
            selected: state.selected.clone(),
            steps: state.steps.clone(),
            result: state.result.clone(),
        }
    }

    /// Whether a run is in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().is_running
    }

    /// Result of the last completed run
    #[must_use]
    pub fn result(&self) -> Option<SimulationResult> {
        self.inner.state.lock().result.clone()
    }
}

/// A simulation accepted by [`SimulationEngine::start`]
#[must_use = "the pipeline only advances while the run is awaited"]
#[derive(Debug)]
pub struct SimulationRun<'a> {
    inner: &'a Inner,
    guard: RunGuard<'a, SimulationState>,
    selected: Vec<String>,
}

impl SimulationRun<'_> {
    /// Drive the pipeline to the end and store the result
    ///
    /// # Errors
    /// `EngineError::Cancelled` if reset while running.
    pub async fn complete(self) -> Result<SimulationResult, EngineError> {
        let Self {
            inner,
            guard,
            selected,
        } = self;
        let ticket = guard.ticket();

        for (idx, &(_, duration_ms)) in STAGES.iter().enumerate() {
            inner.apply(ticket, |state| state.set_stage(idx, StageStatus::Running))?;
            inner
                .scheduler
                .delay(ticket, Duration::from_millis(duration_ms))
                .await?;
            inner.apply(ticket, |state| state.set_stage(idx, StageStatus::Completed))?;
        }

        let result = SimulationResult::compute(&inner.catalog, &selected);
        inner.apply(ticket, |state| {
            state.result = Some(result.clone());
            state.is_running = false;
            Ok(())
        })?;
        guard.disarm();
        tracing::info!(
            run = %result.run_id,
            success_probability = result.success_probability,
            risk = %result.risk_level,
            "simulation complete"
        );
        Ok(result)
    }
}
