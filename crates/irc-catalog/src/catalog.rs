//! Alert catalog
//!
//! Loads incident records once, validates them, and serves them by id.
//! Sources:
//! - The JSON document compiled into the crate ([`AlertCatalog::builtin`])
//! - JSON or YAML strings
//! - Files, format picked by extension

use crate::error::CatalogError;
use crate::strategy::{StrategyDetails, StrategyTable};
use crate::types::{AlertId, AlertStatus, IncidentAlert, Severity};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BUILTIN_ALERTS: &str = include_str!("../data/alerts.json");

/// Counts shown on the alert dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// All alerts
    pub total: usize,
    /// Alerts with critical severity
    pub critical: usize,
    /// Alerts still active
    pub active: usize,
}

/// Read-only collection of incident records plus the strategy table
#[derive(Debug, Clone)]
pub struct AlertCatalog {
    alerts: Vec<IncidentAlert>,
    index: HashMap<AlertId, usize>,
    strategies: StrategyTable,
}

impl AlertCatalog {
    /// Catalog compiled into the crate, with the builtin strategy table
    ///
    /// # Errors
    /// Only if an embedded document is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_ALERTS)
    }

    /// Parse a JSON array of alerts
    ///
    /// # Errors
    /// Parse failures and violated record invariants.
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let alerts: Vec<IncidentAlert> = serde_json::from_str(source)?;
        Self::from_alerts(alerts)
    }

    /// Parse a YAML sequence of alerts
    ///
    /// # Errors
    /// Parse failures and violated record invariants.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let alerts: Vec<IncidentAlert> = serde_yaml::from_str(source)?;
        Self::from_alerts(alerts)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// - `CatalogError::Io` if the file cannot be read
    /// - `CatalogError::UnsupportedFormat` for any other extension
    /// - Parse and validation errors as for the string loaders
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, CatalogError> = match ext.as_deref() {
            Some("json") => Self::from_json_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        };
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = parse(&source)?;
        tracing::info!(path = %path.display(), alerts = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Validate records and build the id index
    ///
    /// # Errors
    /// - `CatalogError::DuplicateAlert` when two records share an id
    /// - `CatalogError::EmptyAffectedSystems` when a record lists none
    /// - `CatalogError::DuplicateRecommendation` when a record repeats a text
    pub fn from_alerts(alerts: Vec<IncidentAlert>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(alerts.len());
        for (idx, alert) in alerts.iter().enumerate() {
            validate_alert(alert)?;
            if index.insert(alert.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateAlert(alert.id.to_string()));
            }
        }
        Ok(Self {
            alerts,
            index,
            strategies: StrategyTable::builtin()?,
        })
    }

    /// Replace the strategy table
    #[must_use]
    pub fn with_strategies(mut self, strategies: StrategyTable) -> Self {
        self.strategies = strategies;
        self
    }

    /// Alert by id
    ///
    /// # Errors
    /// `CatalogError::AlertNotFound` for an unknown id.
    pub fn get(&self, id: &str) -> Result<&IncidentAlert, CatalogError> {
        id.parse::<AlertId>()
            .ok()
            .and_then(|id| self.index.get(&id))
            .map(|&idx| &self.alerts[idx])
            .ok_or_else(|| CatalogError::AlertNotFound(id.to_string()))
    }

    /// All alerts in catalog order
    #[inline]
    #[must_use]
    pub fn alerts(&self) -> &[IncidentAlert] {
        &self.alerts
    }

    /// Iterate alerts in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &IncidentAlert> {
        self.alerts.iter()
    }

    /// Number of alerts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the catalog holds no alerts
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// The strategy lookup table
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &StrategyTable {
        &self.strategies
    }

    /// Details for a recommendation text. Never fails.
    #[must_use]
    pub fn strategy_details(&self, text: &str) -> Cow<'_, StrategyDetails> {
        self.strategies.details(text)
    }

    /// Dashboard counts
    #[must_use]
    pub fn summary(&self) -> DashboardSummary {
        self.alerts.iter().fold(
            DashboardSummary {
                total: self.alerts.len(),
                ..DashboardSummary::default()
            },
            |mut acc, alert| {
                if alert.severity == Severity::Critical {
                    acc.critical += 1;
                }
                if alert.status == AlertStatus::Active {
                    acc.active += 1;
                }
                acc
            },
        )
    }
}

impl<'a> IntoIterator for &'a AlertCatalog {
    type Item = &'a IncidentAlert;
    type IntoIter = std::slice::Iter<'a, IncidentAlert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}

fn validate_alert(alert: &IncidentAlert) -> Result<(), CatalogError> {
    if alert.affected_systems.is_empty() {
        return Err(CatalogError::EmptyAffectedSystems(alert.id.to_string()));
    }
    let mut seen = HashSet::new();
    for text in alert.recommendations() {
        if !seen.insert(text.as_str()) {
            return Err(CatalogError::DuplicateRecommendation {
                alert: alert.id.to_string(),
                text: text.clone(),
            });
        }
    }
    Ok(())
}
