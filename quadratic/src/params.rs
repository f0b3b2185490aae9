//! Tunable engine parameters with TOML support.
//!
//! The anomaly heuristics are rule-of-thumb thresholds whose false-positive
//! and false-negative rates have not been measured; deployments are expected
//! to tune them against real traffic rather than rely on the defaults.

use crate::error::QuadraticError;
use serde::{Deserialize, Serialize};

/// Thresholds for the four anomaly signals and the confidence score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThresholds {
    /// A voter whose first and last vote are less than this many seconds
    /// apart is "rapid" (when they also exceed `rapid_min_votes`).
    #[serde(default = "default_rapid_window_secs")]
    pub rapid_window_secs: u64,

    /// Rapid voting requires strictly more votes than this.
    #[serde(default = "default_rapid_min_votes")]
    pub rapid_min_votes: usize,

    /// Allowed absolute difference between recorded and computed cost.
    #[serde(default = "default_cost_tolerance")]
    pub cost_tolerance: f64,

    /// Share of a voter's total vote count (basis points, 8000 = 80%) that a
    /// single vote must exceed to count as extreme concentration.
    #[serde(default = "default_concentration_bps")]
    pub concentration_bps: u32,

    /// Voters with fewer votes than this are never checked for concentration.
    /// The default of 1 checks everyone, so a lone vote is always flagged.
    #[serde(default = "default_concentration_min_votes")]
    pub concentration_min_votes: usize,

    /// More distinct voters than this on one IP address flags all of them.
    #[serde(default = "default_max_voters_per_ip")]
    pub max_voters_per_ip: usize,

    /// Multiplier applied to `flagged_share * pattern_count`.
    #[serde(default = "default_confidence_scale")]
    pub confidence_scale: f64,
}

/// Everything configurable about the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// How many submissions `generate_insights` lists as top targets.
    #[serde(default = "default_top_target_count")]
    pub top_target_count: usize,

    /// Upper end of the preference scale used by `optimize_allocation`.
    #[serde(default = "default_max_preference")]
    pub max_preference: f64,

    #[serde(default)]
    pub anomaly: AnomalyThresholds,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rapid_window_secs() -> u64 {
    30
}

fn default_rapid_min_votes() -> usize {
    3
}

fn default_cost_tolerance() -> f64 {
    0.01
}

fn default_concentration_bps() -> u32 {
    8_000
}

fn default_concentration_min_votes() -> usize {
    1
}

fn default_max_voters_per_ip() -> usize {
    5
}

fn default_confidence_scale() -> f64 {
    0.1
}

fn default_top_target_count() -> usize {
    5
}

fn default_max_preference() -> f64 {
    10.0
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AnomalyThresholds {
    pub fn validate(&self) -> Result<(), QuadraticError> {
        if self.rapid_window_secs == 0 {
            return Err(QuadraticError::InvalidParams(
                "rapid_window_secs must be positive".into(),
            ));
        }
        if self.concentration_bps > 10_000 {
            return Err(QuadraticError::InvalidParams(format!(
                "concentration_bps {} exceeds 10000",
                self.concentration_bps
            )));
        }
        if !(self.cost_tolerance.is_finite() && self.cost_tolerance >= 0.0) {
            return Err(QuadraticError::InvalidParams(format!(
                "cost_tolerance must be a non-negative number, got {}",
                self.cost_tolerance
            )));
        }
        if !(self.confidence_scale.is_finite() && self.confidence_scale >= 0.0) {
            return Err(QuadraticError::InvalidParams(format!(
                "confidence_scale must be a non-negative number, got {}",
                self.confidence_scale
            )));
        }
        Ok(())
    }
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            rapid_window_secs: default_rapid_window_secs(),
            rapid_min_votes: default_rapid_min_votes(),
            cost_tolerance: default_cost_tolerance(),
            concentration_bps: default_concentration_bps(),
            concentration_min_votes: default_concentration_min_votes(),
            max_voters_per_ip: default_max_voters_per_ip(),
            confidence_scale: default_confidence_scale(),
        }
    }
}

impl EngineParams {
    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, QuadraticError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuadraticError::InvalidParams(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, QuadraticError> {
        let params: Self =
            toml::from_str(s).map_err(|e| QuadraticError::InvalidParams(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize the parameters to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("EngineParams is always serializable to TOML")
    }

    pub fn validate(&self) -> Result<(), QuadraticError> {
        self.anomaly.validate()?;
        if !(self.max_preference.is_finite() && self.max_preference > 0.0) {
            return Err(QuadraticError::InvalidParams(format!(
                "max_preference must be a positive number, got {}",
                self.max_preference
            )));
        }
        Ok(())
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            top_target_count: default_top_target_count(),
            max_preference: default_max_preference(),
            anomaly: AnomalyThresholds::default(),
        }
    }
}
