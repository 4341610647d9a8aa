use serde::{Deserialize, Serialize};

use crate::color::Luminosity;
use crate::error::ConfigError;
use crate::similarity::NameMatcher;

/// Tunables for a [`Planner`](crate::Planner). Every field has a default, so `{}` is a valid
/// config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    #[serde(default)]
    pub color_luminosity: Luminosity,
    #[serde(default = "PlannerConfig::default_color_attempts")]
    pub color_attempts: usize,
    #[serde(default = "PlannerConfig::default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "PlannerConfig::default_match_window")]
    pub match_window: usize,
    /// Fixed seed for entry colors. Without one, colors come from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl PlannerConfig {
    const fn default_color_attempts() -> usize {
        64
    }

    const fn default_similarity_threshold() -> f64 {
        0.9
    }

    const fn default_match_window() -> usize {
        3
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::RangeViolation {
                field: "similarity_threshold",
                min: 0.0,
                max: 1.0,
                value: self.similarity_threshold,
            });
        }
        if self.color_attempts < 1 {
            return Err(ConfigError::MinViolation {
                field: "color_attempts",
                min: 1,
                value: self.color_attempts,
            });
        }
        if self.match_window < 1 {
            return Err(ConfigError::MinViolation {
                field: "match_window",
                min: 1,
                value: self.match_window,
            });
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn name_matcher(&self) -> NameMatcher {
        NameMatcher {
            threshold: self.similarity_threshold,
            window: self.match_window,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            color_luminosity: Luminosity::default(),
            color_attempts: Self::default_color_attempts(),
            similarity_threshold: Self::default_similarity_threshold(),
            match_window: Self::default_match_window(),
            seed: None,
        }
    }
}
