//! Testing utilities for the IRC workspace
//!
//! Shared fixtures: the builtin catalog, engine configs, controllers and an
//! alert builder for hand-made records.

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use irc_catalog::{
    ActionDetail, AlertCatalog, AlertDetails, AlertId, AlertStatus, DecisionDetail,
    DetectionDetail, IncidentAlert, IncidentPhase, ResolutionDetail, Severity, SituationDetail,
};
use irc_engine::{EngineConfig, IncidentDetailController, TimingConfig};
use std::sync::Arc;

/// Total simulated time of one bridge assembly at default timing
pub const ASSEMBLY_MS: u64 = 7 * (1200 + 800);

/// Total simulated time of one simulation run
pub const SIMULATION_MS: u64 = 1000 + 1200 + 1500 + 1000 + 800 + 600;

/// Total simulated time of one execution run
pub const EXECUTION_MS: u64 = 1500 + 1000 + 2000 + 1800 + 1500 + 1200 + 1000 + 1500 + 1200 + 800;

pub fn builtin_catalog() -> Arc<AlertCatalog> {
    Arc::new(AlertCatalog::builtin().unwrap())
}

/// Default timing; pair with `start_paused` tests
pub fn test_config() -> EngineConfig {
    EngineConfig::default()
}

/// Millisecond-scale delays for tests on a real clock
pub fn fast_config() -> EngineConfig {
    EngineConfig::default().with_time_scale(0.01)
}

/// Bridge timing shortened to `calling`/`joining` ms with a 1s clock
pub fn short_timing(calling_delay_ms: u64, joining_delay_ms: u64) -> EngineConfig {
    EngineConfig::default().with_timing(TimingConfig {
        calling_delay_ms,
        joining_delay_ms,
        tick_interval_ms: 1000,
    })
}

pub fn controller_for(alert_id: &str) -> IncidentDetailController {
    IncidentDetailController::new(builtin_catalog(), test_config(), alert_id).unwrap()
}

pub fn controller_with(catalog: AlertCatalog, alert_id: &str) -> IncidentDetailController {
    IncidentDetailController::new(Arc::new(catalog), test_config(), alert_id).unwrap()
}

/// Builder for hand-made alerts
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    id: String,
    title: String,
    severity: Severity,
    status: AlertStatus,
    affected_systems: Vec<String>,
    recommendations: Vec<String>,
}

impl AlertBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Test alert {id}"),
            severity: Severity::Medium,
            status: AlertStatus::Active,
            affected_systems: vec!["Test System".to_string()],
            recommendations: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn resolved(mut self) -> Self {
        self.status = AlertStatus::Resolved;
        self
    }

    pub fn affected_systems(mut self, systems: &[&str]) -> Self {
        self.affected_systems = systems.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn recommendation(mut self, text: &str) -> Self {
        self.recommendations.push(text.to_string());
        self
    }

    pub fn build(self) -> IncidentAlert {
        let text = |s: &str| s.to_string();
        IncidentAlert {
            id: self.id.parse::<AlertId>().unwrap(),
            title: self.title,
            severity: self.severity,
            status: self.status,
            timestamp: Utc.with_ymd_and_hms(2024, 12, 4, 8, 0, 0).unwrap(),
            source: text("Test Harness"),
            affected_systems: self.affected_systems,
            business_impact: text("Test impact - $1/hour"),
            sla_risk: text("None"),
            region: text("Global"),
            phase: IncidentPhase::Detection,
            details: AlertDetails {
                situation: SituationDetail {
                    business_context: text("context"),
                    soc_role: text("soc"),
                    noc_role: text("noc"),
                },
                detection: DetectionDetail {
                    what_happens: text("signal"),
                    challenge_today: text("challenge"),
                    future_state: text("future"),
                },
                decision: DecisionDetail {
                    leader_role: text("leader"),
                    soc_noc_functionality: text("soc/noc"),
                    challenge_today: text("challenge"),
                },
                action: ActionDetail {
                    automated_actions: vec![text("automated")],
                    human_actions: vec![text("human")],
                    challenge_today: text("challenge"),
                },
                resolution: ResolutionDetail {
                    outcome: text("outcome"),
                    soc_noc_role: text("role"),
                    challenge_today: text("challenge"),
                },
                ai_recommendations: self.recommendations,
                workflow_impact: Vec::new(),
                simulation_scenarios: Vec::new(),
                regional_data: None,
            },
        }
    }
}

/// Catalog of the given alerts with the builtin strategy table
pub fn catalog_of(alerts: Vec<IncidentAlert>) -> AlertCatalog {
    AlertCatalog::from_alerts(alerts).unwrap()
}
