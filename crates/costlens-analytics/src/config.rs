//! Configuration for analytics requests.
//!
//! Loaded from `~/.costlens/config.yaml` when present. Every field is
//! optional in the file; missing fields keep their defaults.
//!
//! ```yaml
//! days_back: 30
//! anomaly_threshold: 2.0
//! lookback_days: 30
//! forecast_horizon: 7
//! forecast_history_days: 30
//! ```

use crate::anomaly::MIN_BASELINE_SAMPLES;
use crate::error::{CostError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Defaults applied when a request leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Days of history for trend requests
    pub days_back: u32,

    /// z-score above which an observation is flagged
    pub anomaly_threshold: f64,

    /// Days of history used to build anomaly baselines
    pub lookback_days: u32,

    /// Days to forecast
    pub forecast_horizon: u32,

    /// Days of trend history fed to the forecaster
    pub forecast_history_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            days_back: 30,
            anomaly_threshold: 2.0,
            lookback_days: 30,
            forecast_horizon: 7,
            forecast_history_days: 30,
        }
    }
}

impl AnalyticsConfig {
    /// Load from `~/.costlens/config.yaml`, falling back to defaults.
    pub fn load_default() -> Result<Self> {
        let path = costlens_core::paths::default_config_file()
            .map_err(|e| CostError::Config(e.to_string()))?;
        Self::load(path)
    }

    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file does not exist: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&config_str)?;
        info!("Loaded analytics config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(CostError::Config(format!(
                "anomaly_threshold must be positive, got {}",
                self.anomaly_threshold
            )));
        }
        if self.forecast_horizon == 0 {
            return Err(CostError::Config(
                "forecast_horizon must be at least 1".to_string(),
            ));
        }
        if (self.lookback_days as usize) < MIN_BASELINE_SAMPLES {
            return Err(CostError::Config(format!(
                "lookback_days must be at least {}, got {}",
                MIN_BASELINE_SAMPLES, self.lookback_days
            )));
        }
        if self.days_back == 0 || self.forecast_history_days == 0 {
            return Err(CostError::Config(
                "days_back and forecast_history_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the trend history length.
    pub fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    /// Set the anomaly threshold.
    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    /// Set the baseline lookback.
    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Set the forecast horizon.
    pub fn with_forecast_horizon(mut self, horizon: u32) -> Self {
        self.forecast_horizon = horizon;
        self
    }
}
