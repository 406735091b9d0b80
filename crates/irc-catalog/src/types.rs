//! Incident record types
//!
//! Defines the immutable data loaded from the catalog:
//! - Alert identity, severity, status and phase tags
//! - Per-phase narrative details
//! - Workflow, simulation-scenario and regional impact data

use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Incident identifier of the form `INC-YYYY-NNN`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlertId(String);

impl AlertId {
    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(raw: &str) -> bool {
        let mut parts = raw.split('-');
        let (Some(prefix), Some(year), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == "INC"
            && year.len() == 4
            && year.bytes().all(|b| b.is_ascii_digit())
            && seq.len() == 3
            && seq.bytes().all(|b| b.is_ascii_digit())
    }
}

impl FromStr for AlertId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CatalogError::InvalidAlertId(s.to_string()))
        }
    }
}

impl TryFrom<String> for AlertId {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlertId> for String {
    fn from(value: AlertId) -> Self {
        value.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Revenue or SLA impacting right now
    Critical,
    /// Degraded but contained
    Medium,
    /// Proactive / informational
    Low,
}

impl Severity {
    /// Upper-case display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// Alert status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Still being worked
    Active,
    /// Closed out
    Resolved,
}

/// Incident lifecycle phase. Descriptive only; nothing transitions on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentPhase {
    /// Business context gathering
    Situation,
    /// Signal detection
    Detection,
    /// Leader decision
    Decision,
    /// Remediation in flight
    Action,
    /// Outcome and RCA
    Resolution,
}

impl IncidentPhase {
    /// Numbered label, e.g. `2. Detection`
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IncidentPhase::Situation => "1. Situation",
            IncidentPhase::Detection => "2. Detection",
            IncidentPhase::Decision => "3. Decision",
            IncidentPhase::Action => "4. Action",
            IncidentPhase::Resolution => "5. Resolution",
        }
    }
}

/// A single incident record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentAlert {
    /// Unique id
    pub id: AlertId,
    /// Headline
    pub title: String,
    /// Severity
    pub severity: Severity,
    /// Status
    pub status: AlertStatus,
    /// Detection instant
    pub timestamp: DateTime<Utc>,
    /// Originating monitoring source
    pub source: String,
    /// Affected systems, display order
    pub affected_systems: Vec<String>,
    /// Business impact summary
    pub business_impact: String,
    /// SLA risk summary
    pub sla_risk: String,
    /// Regions involved
    pub region: String,
    /// Descriptive phase tag
    pub phase: IncidentPhase,
    /// Nested narrative and planning data
    pub details: AlertDetails,
}

impl IncidentAlert {
    /// Recommendation texts in catalog order
    #[inline]
    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.details.ai_recommendations
    }

    /// Whether `text` is one of this alert's recommendations
    #[must_use]
    pub fn recommends(&self, text: &str) -> bool {
        self.details.ai_recommendations.iter().any(|r| r == text)
    }

    /// Short impact figure: the part after `" - "` when present
    #[must_use]
    pub fn impact_headline(&self) -> &str {
        self.business_impact
            .split_once(" - ")
            .map_or(self.business_impact.as_str(), |(_, tail)| tail)
    }
}

/// Narrative details for every phase plus planning data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    /// Situation narrative
    pub situation: SituationDetail,
    /// Detection narrative
    pub detection: DetectionDetail,
    /// Decision narrative
    pub decision: DecisionDetail,
    /// Action narrative
    pub action: ActionDetail,
    /// Resolution narrative
    pub resolution: ResolutionDetail,
    /// Strategy descriptions, unique, catalog order
    #[serde(default)]
    pub ai_recommendations: Vec<String>,
    /// Workflow steps affected by the incident
    #[serde(default)]
    pub workflow_impact: Vec<WorkflowStep>,
    /// Pre-modelled remediation scenarios
    #[serde(default)]
    pub simulation_scenarios: Vec<SimulationScenario>,
    /// Per-region impact, where the incident is multi-region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_data: Option<Vec<RegionalImpact>>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationDetail {
    pub business_context: String,
    pub soc_role: String,
    pub noc_role: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionDetail {
    pub what_happens: String,
    pub challenge_today: String,
    pub future_state: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDetail {
    pub leader_role: String,
    pub soc_noc_functionality: String,
    pub challenge_today: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetail {
    pub automated_actions: Vec<String>,
    pub human_actions: Vec<String>,
    pub challenge_today: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetail {
    pub outcome: String,
    pub soc_noc_role: String,
    pub challenge_today: String,
}

/// Status of a workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStatus {
    /// Not started
    Pending,
    /// Running
    InProgress,
    /// Done
    Completed,
    /// Waiting on something outside the workflow
    Blocked,
}

/// One step of an affected workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Step id, e.g. `WF-001`
    pub id: String,
    /// Display name
    pub name: String,
    /// Current status
    pub status: WorkflowStatus,
    /// Elapsed or estimated duration, display string
    pub duration: String,
    /// Ids of steps this one waits on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Risk tag on a pre-modelled scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioRisk {
    #[allow(missing_docs)]
    Low,
    #[allow(missing_docs)]
    Medium,
    #[allow(missing_docs)]
    High,
}

/// Pre-modelled remediation scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationScenario {
    /// Scenario id, e.g. `SIM-001`
    pub id: String,
    /// Display name
    pub name: String,
    /// What the scenario does
    pub description: String,
    /// Risk tag
    pub risk_level: ScenarioRisk,
    /// Display duration
    pub estimated_time: String,
    /// Historical success rate, percent
    pub success_rate: f64,
}

/// Impact of the incident on one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalImpact {
    /// Region display name
    pub region: String,
    /// Peak window in UTC
    #[serde(rename = "peakHoursUTC")]
    pub peak_hours_utc: String,
    /// Load, percent of capacity
    pub current_traffic_load: u32,
    /// Revenue per hour, display string in local currency
    pub revenue_per_hour: String,
    /// ISO currency code
    pub currency: String,
    /// Whether the region is inside its peak window
    pub is_currently_peak: bool,
    /// Where traffic would fail over to
    pub failover_target: String,
    /// Baseline latency, ms
    pub latency_baseline: u32,
    /// Current latency, ms
    pub current_latency: u32,
}

impl RegionalImpact {
    /// Current latency as a multiple of baseline
    #[must_use]
    pub fn latency_factor(&self) -> f64 {
        if self.latency_baseline == 0 {
            return 0.0;
        }
        f64::from(self.current_latency) / f64::from(self.latency_baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_id_accepts_canonical_form() {
        let id: AlertId = "INC-2024-001".parse().unwrap();
        assert_eq!(id.as_str(), "INC-2024-001");
        assert_eq!(id.to_string(), "INC-2024-001");
    }

    #[test]
    fn alert_id_rejects_malformed() {
        for raw in ["", "INC-24-001", "INC-2024-1", "ALR-2024-001", "INC-2024-001-x", "INC-20a4-001"] {
            assert!(raw.parse::<AlertId>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn phase_labels_are_numbered() {
        assert_eq!(IncidentPhase::Situation.label(), "1. Situation");
        assert_eq!(IncidentPhase::Resolution.label(), "5. Resolution");
    }

    #[test]
    fn workflow_status_uses_kebab_case() {
        let status: WorkflowStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(status, WorkflowStatus::InProgress);
    }

    #[test]
    fn latency_factor_handles_zero_baseline() {
        let region = RegionalImpact {
            region: "x".into(),
            peak_hours_utc: "00:00-01:00 UTC".into(),
            current_traffic_load: 10,
            revenue_per_hour: "$1".into(),
            currency: "USD".into(),
            is_currently_peak: false,
            failover_target: "y".into(),
            latency_baseline: 0,
            current_latency: 100,
        };
        assert_eq!(region.latency_factor(), 0.0);
    }
}
