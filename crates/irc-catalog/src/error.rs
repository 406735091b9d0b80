//! Error types for the alert catalog
//!
//! Covers:
//! - Malformed catalog sources (JSON / YAML / IO)
//! - Record invariants violated at load time
//! - Lookups of unknown alerts

use std::path::PathBuf;

/// Catalog loading and lookup errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// JSON source failed to parse
    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML source failed to parse
    #[error("invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Catalog file could not be read
    #[error("cannot read catalog {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// File extension is not one we know how to parse
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Id does not match `INC-YYYY-NNN`
    #[error("invalid alert id: {0:?}")]
    InvalidAlertId(String),

    /// Two records share an id
    #[error("duplicate alert id: {0}")]
    DuplicateAlert(String),

    /// Record lists no affected systems
    #[error("alert {0} has no affected systems")]
    EmptyAffectedSystems(String),

    /// Record repeats a recommendation text
    #[error("alert {alert} repeats recommendation {text:?}")]
    DuplicateRecommendation {
        /// Offending alert
        alert: String,
        /// Repeated text
        text: String,
    },

    /// Two strategy entries share an id
    #[error("duplicate strategy id: {0}")]
    DuplicateStrategyId(String),

    /// Strategy table maps one text to two strategies
    #[error("recommendation text {0:?} is claimed by more than one strategy")]
    AmbiguousStrategyText(String),

    /// No alert with this id
    #[error("alert not found: {0}")]
    AlertNotFound(String),
}

impl CatalogError {
    /// Whether the error came from the source document rather than a lookup
    #[inline]
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::AlertNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_alert() {
        let err = CatalogError::EmptyAffectedSystems("INC-2024-009".to_string());
        assert!(err.to_string().contains("INC-2024-009"));
    }

    #[test]
    fn not_found_is_not_a_load_error() {
        assert!(!CatalogError::AlertNotFound("x".into()).is_load_error());
        assert!(CatalogError::InvalidAlertId("x".into()).is_load_error());
    }
}
