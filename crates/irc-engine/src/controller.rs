//! Incident detail controller
//!
//! View-level coordinator for one displayed alert. Owns:
//! - The three engines and every run they produce
//! - Dialog flags, the active tab and the strategy selection
//! - The war-room results slot and the operator notice feed
//!
//! Selecting another alert throws all of it away.

use crate::error::{EngineError, ValidationError};
use crate::execution::{ExecutionEngine, ExecutionSnapshot, ImpactMetrics};
use crate::simulation::{SimulationEngine, SimulationResult, SimulationSnapshot};
use crate::types::{EngineConfig, Notice, Tab, WarRoomPhase};
use crate::war_room::{WarRoomCommand, WarRoomEngine, WarRoomSnapshot};
use indexmap::IndexSet;
use irc_catalog::{AlertCatalog, AlertId, IncidentAlert, StrategyDetails};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Strategy open in the deep-dive dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeepDive {
    /// Recommendation text
    pub strategy: String,
    /// Resolved details
    pub details: StrategyDetails,
}

/// Everything a renderer needs, copied out at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Displayed alert
    pub alert_id: AlertId,
    /// Active tab
    pub tab: Tab,
    /// War-room dialog visible
    pub war_room_open: bool,
    /// War-room dialog minimized
    pub war_room_minimized: bool,
    /// Bridge session
    pub war_room: WarRoomSnapshot,
    /// Deep-dive dialog
    pub deep_dive: Option<DeepDive>,
    /// Selected strategies, selection order
    pub selected_strategies: Vec<String>,
    /// Simulation engine
    pub simulation: SimulationSnapshot,
    /// Result kept from the last war room
    pub war_room_results: Option<SimulationResult>,
    /// Execution engine
    pub execution: ExecutionSnapshot,
    /// Leader actions, in order taken
    pub actions_taken: Vec<String>,
}

impl ViewState {
    /// Live assembly seconds while the war room is active and minimized
    #[must_use]
    pub fn minimized_indicator(&self) -> Option<u64> {
        (self.war_room.is_active() && self.war_room_minimized).then_some(self.war_room.assembly_time)
    }

    /// Whether the execute action is available
    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.war_room_results.is_some() && !self.execution.is_running
    }
}

#[derive(Debug)]
struct ViewFlags {
    alert: IncidentAlert,
    tab: Tab,
    war_room_open: bool,
    war_room_minimized: bool,
    deep_dive: Option<String>,
    selected: IndexSet<String>,
    war_room_results: Option<SimulationResult>,
    actions_taken: Vec<String>,
    notices: Vec<Notice>,
}

impl ViewFlags {
    fn new(alert: IncidentAlert) -> Self {
        Self {
            alert,
            tab: Tab::default(),
            war_room_open: false,
            war_room_minimized: false,
            deep_dive: None,
            selected: IndexSet::new(),
            war_room_results: None,
            actions_taken: Vec::new(),
            notices: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    catalog: Arc<AlertCatalog>,
    config: EngineConfig,
    view: Mutex<ViewFlags>,
    war_room: WarRoomEngine,
    simulation: SimulationEngine,
    execution: ExecutionEngine,
}

/// Cloneable handle to the controller of one detail view
#[derive(Debug, Clone)]
pub struct IncidentDetailController {
    inner: Arc<Inner>,
}

impl IncidentDetailController {
    /// Controller displaying `alert_id`
    ///
    /// # Errors
    /// - `EngineError::Config` for an invalid configuration
    /// - `EngineError::Catalog` if the alert is unknown
    pub fn new(
        catalog: Arc<AlertCatalog>,
        config: EngineConfig,
        alert_id: &str,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let alert = catalog.get(alert_id)?.clone();
        Ok(Self {
            inner: Arc::new(Inner {
                war_room: WarRoomEngine::new(&config),
                simulation: SimulationEngine::new(Arc::clone(&catalog), &config),
                execution: ExecutionEngine::new(&config),
                view: Mutex::new(ViewFlags::new(alert)),
                catalog,
                config,
            }),
        })
    }

    /// Displayed alert
    #[must_use]
    pub fn alert(&self) -> IncidentAlert {
        self.inner.view.lock().alert.clone()
    }

    /// The catalog this controller reads from
    #[must_use]
    pub fn catalog(&self) -> &Arc<AlertCatalog> {
        &self.inner.catalog
    }

    /// War-room engine handle
    #[must_use]
    pub fn war_room(&self) -> &WarRoomEngine {
        &self.inner.war_room
    }

    /// Simulation engine handle
    #[must_use]
    pub fn simulation(&self) -> &SimulationEngine {
        &self.inner.simulation
    }

    /// Execution engine handle
    #[must_use]
    pub fn execution(&self) -> &ExecutionEngine {
        &self.inner.execution
    }

    /// Switch to another alert, discarding every run and flag
    ///
    /// Selecting the displayed alert again is a no-op.
    ///
    /// # Errors
    /// `EngineError::Catalog` if the alert is unknown; nothing changes.
    pub fn select_alert(&self, alert_id: &str) -> Result<(), EngineError> {
        if self.inner.view.lock().alert.id.as_str() == alert_id {
            return Ok(());
        }
        let alert = match self.inner.catalog.get(alert_id) {
            Ok(alert) => alert.clone(),
            Err(err) => return Err(self.reject(err.into())),
        };
        self.inner.war_room.reset_state();
        self.inner.simulation.reset();
        self.inner.execution.reset();
        tracing::info!(alert = %alert.id, "alert selected");
        *self.inner.view.lock() = ViewFlags::new(alert);
        Ok(())
    }

    /// Switch tab
    pub fn set_tab(&self, tab: Tab) {
        self.inner.view.lock().tab = tab;
    }

    /// Active tab
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.inner.view.lock().tab
    }

    /// Recommendations offered in the war-room dialog
    #[must_use]
    pub fn war_room_candidates(&self) -> Vec<String> {
        let view = self.inner.view.lock();
        view.alert
            .recommendations()
            .iter()
            .take(self.inner.config.war_room_candidate_limit)
            .cloned()
            .collect()
    }

    /// Open the war room
    ///
    /// A no-op on the engine when already open; the dialog is shown again.
    ///
    /// # Errors
    /// `ValidationError::WarRoomInProgress` while assembling or live.
    pub fn initiate_war_room(&self) -> Result<(), EngineError> {
        if matches!(
            self.inner.war_room.phase(),
            WarRoomPhase::Assembling | WarRoomPhase::Active
        ) {
            return Err(self.reject(ValidationError::WarRoomInProgress.into()));
        }
        self.inner.war_room.dispatch(WarRoomCommand::Initiate)?;
        let mut view = self.inner.view.lock();
        view.war_room_open = true;
        view.war_room_minimized = false;
        tracing::info!(alert = %view.alert.id, "war room initiated");
        Ok(())
    }

    /// Start calling the bridge
    ///
    /// # Errors
    /// Validation errors from the war-room engine.
    pub fn assemble_bridge(&self) -> Result<(), EngineError> {
        self.inner
            .war_room
            .dispatch(WarRoomCommand::StartCallingSequence)
            .map_err(|err| self.reject(err))
    }

    /// Hide the dialog, leaving the session running
    ///
    /// # Errors
    /// `ValidationError::WarRoomNotInitiated` before the war room was opened.
    pub fn minimize_war_room(&self) -> Result<(), EngineError> {
        self.require_initiated()?;
        let mut view = self.inner.view.lock();
        view.war_room_open = false;
        view.war_room_minimized = true;
        Ok(())
    }

    /// Reopen a minimized war room
    ///
    /// Returns `false` unless it is minimized while assembling or live.
    pub fn restore_war_room(&self) -> bool {
        let running = matches!(
            self.inner.war_room.phase(),
            WarRoomPhase::Assembling | WarRoomPhase::Active
        );
        let mut view = self.inner.view.lock();
        if !(running && view.war_room_minimized) {
            return false;
        }
        view.war_room_minimized = false;
        view.war_room_open = true;
        true
    }

    /// End the session, keeping any simulation result for the decision tab
    ///
    /// # Errors
    /// `ValidationError::WarRoomNotInitiated` before the war room was opened.
    pub fn end_war_room(&self) -> Result<(), EngineError> {
        self.require_initiated()?;
        let result = self.inner.simulation.result();
        self.inner.war_room.dispatch(WarRoomCommand::Reset)?;
        let mut view = self.inner.view.lock();
        if let Some(result) = result {
            view.war_room_results = Some(result);
        }
        view.war_room_open = false;
        view.war_room_minimized = false;
        view.tab = Tab::Decision;
        view.notices.push(Notice::info(
            "War Room session has ended. View your simulation results in the Decision tab.",
        ));
        tracing::info!(alert = %view.alert.id, kept_results = view.war_room_results.is_some(), "war room ended");
        Ok(())
    }

    /// Add or remove a strategy; returns whether it is now selected
    ///
    /// # Errors
    /// `ValidationError::UnknownStrategy` for text the alert does not recommend.
    pub fn toggle_strategy(&self, strategy: &str) -> Result<bool, EngineError> {
        let mut view = self.inner.view.lock();
        if !view.alert.recommends(strategy) {
            drop(view);
            return Err(self.reject(ValidationError::UnknownStrategy(strategy.to_string()).into()));
        }
        if view.selected.shift_remove(strategy) {
            Ok(false)
        } else {
            view.selected.insert(strategy.to_string());
            Ok(true)
        }
    }

    /// Selected strategies, selection order
    #[must_use]
    pub fn selected_strategies(&self) -> Vec<String> {
        self.inner.view.lock().selected.iter().cloned().collect()
    }

    /// Simulate the current selection
    ///
    /// Returns `None` if a reset overtook the run.
    ///
    /// # Errors
    /// - `ValidationError::NoStrategiesSelected` for an empty selection
    /// - `ValidationError::SimulationRunning` while another run is in flight
    pub async fn simulate(&self) -> Result<Option<SimulationResult>, EngineError> {
        let run = self
            .inner
            .simulation
            .start(self.selected_strategies())
            .map_err(|err| self.reject(err))?;
        self.notify(Notice::info("Starting strategy simulation..."));
        match run.complete().await {
            Ok(result) => {
                self.notify(Notice::success("Simulation complete!"));
                Ok(Some(result))
            }
            Err(EngineError::Cancelled) => Ok(None),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Clear the selection, the simulation and the war-room results
    pub fn reset_simulation(&self) {
        self.inner.simulation.reset();
        let mut view = self.inner.view.lock();
        view.selected.clear();
        view.war_room_results = None;
        view.notices.push(Notice::info("Simulation has been reset."));
    }

    /// Execute the strategies chosen in the war room
    ///
    /// Switches to the execution tab as soon as the run is accepted.
    /// Returns `None` if a reset overtook the run.
    ///
    /// # Errors
    /// - `ValidationError::NoWarRoomResults` without war-room results
    /// - `ValidationError::ExecutionRunning` while another run is in flight
    pub async fn execute_strategies(&self) -> Result<Option<ImpactMetrics>, EngineError> {
        if self.inner.view.lock().war_room_results.is_none() {
            return Err(self.reject(ValidationError::NoWarRoomResults.into()));
        }
        let run = self
            .inner
            .execution
            .start()
            .map_err(|err| self.reject(err))?;
        self.set_tab(Tab::Execution);
        match run.complete().await {
            Ok(metrics) => {
                self.notify(Notice::success(
                    "Execution complete! View Impact tab for results.",
                ));
                Ok(Some(metrics))
            }
            Err(EngineError::Cancelled) => Ok(None),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Record a leader action
    pub fn take_action(&self, label: &str) {
        let mut view = self.inner.view.lock();
        view.actions_taken.push(label.to_string());
        view.notices
            .push(Notice::success(format!("Action initiated: {label}")));
        tracing::info!(alert = %view.alert.id, action = label, "leader action");
    }

    /// Open the deep-dive dialog on a strategy
    pub fn open_deep_dive(&self, strategy: &str) -> StrategyDetails {
        self.inner.view.lock().deep_dive = Some(strategy.to_string());
        self.inner.catalog.strategy_details(strategy).into_owned()
    }

    /// Close the deep-dive dialog
    pub fn close_deep_dive(&self) {
        self.inner.view.lock().deep_dive = None;
    }

    /// Drain pending notices, oldest first
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.view.lock().notices)
    }

    /// Copy out the full view state
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        let war_room = self.inner.war_room.snapshot();
        let simulation = self.inner.simulation.snapshot();
        let execution = self.inner.execution.snapshot();
        let view = self.inner.view.lock();
        ViewState {
            alert_id: view.alert.id.clone(),
            tab: view.tab,
            war_room_open: view.war_room_open,
            war_room_minimized: view.war_room_minimized,
            war_room,
            deep_dive: view.deep_dive.as_ref().map(|strategy| DeepDive {
                strategy: strategy.clone(),
                details: self.inner.catalog.strategy_details(strategy).into_owned(),
            }),
            selected_strategies: view.selected.iter().cloned().collect(),
            simulation,
            war_room_results: view.war_room_results.clone(),
            execution,
            actions_taken: view.actions_taken.clone(),
        }
    }

    fn require_initiated(&self) -> Result<(), EngineError> {
        if self.inner.war_room.phase() == WarRoomPhase::Idle {
            return Err(self.reject(ValidationError::WarRoomNotInitiated.into()));
        }
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        self.inner.view.lock().notices.push(notice);
    }

    /// Surface a user-facing error as a notice and hand it back
    fn reject(&self, err: EngineError) -> EngineError {
        if err.is_user_facing() {
            let mut view = self.inner.view.lock();
            tracing::warn!(alert = %view.alert.id, %err, "action rejected");
            view.notices.push(Notice::error(err.to_string()));
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(id: &str) -> IncidentDetailController {
        let catalog = Arc::new(AlertCatalog::builtin().unwrap());
        IncidentDetailController::new(catalog, EngineConfig::default(), id).unwrap()
    }

    #[test]
    fn candidates_are_capped() {
        let ctrl = controller("INC-2024-001");
        assert_eq!(ctrl.alert().recommendations().len(), 5);
        assert_eq!(ctrl.war_room_candidates().len(), 4);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let ctrl = controller("INC-2024-004");
        let text = ctrl.alert().recommendations()[2].clone();
        assert!(ctrl.toggle_strategy(&text).unwrap());
        assert_eq!(ctrl.selected_strategies(), [text.clone()]);
        assert!(!ctrl.toggle_strategy(&text).unwrap());
        assert!(ctrl.selected_strategies().is_empty());
    }

    #[test]
    fn foreign_strategy_is_rejected_with_notice() {
        let ctrl = controller("INC-2024-004");
        let err = ctrl.toggle_strategy("Reboot the internet").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::UnknownStrategy(_))
        ));
        let notices = ctrl.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::types::NoticeLevel::Error);
        assert!(ctrl.take_notices().is_empty());
    }

    #[test]
    fn take_action_records_and_notifies() {
        let ctrl = controller("INC-2024-001");
        ctrl.take_action("Approve Failover");
        ctrl.take_action("Override Prioritization");
        assert_eq!(
            ctrl.view_state().actions_taken,
            ["Approve Failover", "Override Prioritization"]
        );
        assert_eq!(
            ctrl.take_notices()[0],
            Notice::success("Action initiated: Approve Failover")
        );
    }

    #[test]
    fn deep_dive_resolves_details() {
        let ctrl = controller("INC-2024-001");
        let text = ctrl.alert().recommendations()[0].clone();
        let details = ctrl.open_deep_dive(&text);
        assert_eq!(details.title, "Immediate Failover Strategy");
        assert_eq!(ctrl.view_state().deep_dive.unwrap().details, details);
        ctrl.close_deep_dive();
        assert!(ctrl.view_state().deep_dive.is_none());
    }

    #[test]
    fn end_before_initiate_is_rejected() {
        let ctrl = controller("INC-2024-002");
        assert!(matches!(
            ctrl.end_war_room(),
            Err(EngineError::Validation(ValidationError::WarRoomNotInitiated))
        ));
        assert!(ctrl.minimize_war_room().is_err());
    }

    #[test]
    fn select_unknown_alert_keeps_current() {
        let ctrl = controller("INC-2024-002");
        assert!(ctrl.select_alert("INC-2024-999").unwrap_err().is_user_facing());
        assert_eq!(ctrl.alert().id.as_str(), "INC-2024-002");
    }
}
