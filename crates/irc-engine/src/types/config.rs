use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Smallest effective time scale
pub const MIN_TIME_SCALE: f64 = 0.001;

/// Largest effective time scale
pub const MAX_TIME_SCALE: f64 = 100.0;

/// Engine configuration
///
/// Loaded from TOML; every key is optional.
///
/// ```toml
/// time_scale = 0.5
/// war_room_candidate_limit = 4
///
/// [timing]
/// calling_delay_ms = 1200
/// joining_delay_ms = 800
/// tick_interval_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bridge assembly timing
    pub timing: TimingConfig,
    /// Multiplier on every simulated delay
    pub time_scale: f64,
    /// Recommendations offered in the war-room dialog
    pub war_room_candidate_limit: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With time scale
    #[inline]
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    /// With bridge timing
    #[inline]
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// With war-room candidate limit
    #[inline]
    #[must_use]
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.war_room_candidate_limit = limit;
        self
    }

    /// Parse TOML, then validate
    ///
    /// # Errors
    /// `EngineError::Config` on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `EngineError::Config` if the file is unreadable or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Reject values that cannot drive a simulation
    ///
    /// # Errors
    /// `EngineError::Config` for a non-positive or non-finite time scale.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(EngineError::Config(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Time scale clamped to [`MIN_TIME_SCALE`, `MAX_TIME_SCALE`]
    #[must_use]
    pub fn effective_time_scale(&self) -> f64 {
        if self.time_scale.is_finite() {
            self.time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
        } else {
            1.0
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            time_scale: 1.0,
            war_room_candidate_limit: 4,
        }
    }
}

/// Bridge assembly delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Ring time before a participant picks up
    pub calling_delay_ms: u64,
    /// Connect time before a participant is on the bridge
    pub joining_delay_ms: u64,
    /// Assembly clock period
    pub tick_interval_ms: u64,
}

impl TimingConfig {
    /// Calling delay
    #[inline]
    #[must_use]
    pub fn calling_delay(&self) -> Duration {
        Duration::from_millis(self.calling_delay_ms)
    }

    /// Joining delay
    #[inline]
    #[must_use]
    pub fn joining_delay(&self) -> Duration {
        Duration::from_millis(self.joining_delay_ms)
    }

    /// Clock period
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            calling_delay_ms: 1200,
            joining_delay_ms: 800,
            tick_interval_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("[timing]\ncalling_delay_ms = 10\n").unwrap();
        assert_eq!(config.timing.calling_delay_ms, 10);
        assert_eq!(config.timing.joining_delay_ms, 800);
        assert_eq!(config.war_room_candidate_limit, 4);
    }

    #[test]
    fn non_positive_time_scale_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("time_scale = 0.0"),
            Err(EngineError::Config(_))
        ));
        assert!(EngineConfig::from_toml_str("time_scale = -2.0").is_err());
    }

    #[test]
    fn effective_time_scale_is_clamped() {
        assert_eq!(EngineConfig::new().with_time_scale(500.0).effective_time_scale(), MAX_TIME_SCALE);
        assert_eq!(EngineConfig::new().with_time_scale(1e-9).effective_time_scale(), MIN_TIME_SCALE);
        assert_eq!(EngineConfig::new().with_time_scale(f64::NAN).effective_time_scale(), 1.0);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "time_scale = 0.5\nwar_room_candidate_limit = 2\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.war_room_candidate_limit, 2);
    }
}
