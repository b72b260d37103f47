use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Invalid recommendation weights: {0}")]
pub struct ConfigError(pub String);

/// Maximum contribution of each component, plus the prerequisite threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaWeights {
    pub urgency: f64,
    pub success_prob: f64,
    pub impact: f64,
    pub recency: f64,
    pub readiness: f64,

    /// Completion ratio a prerequisite module must reach to count as satisfied
    pub prerequisite_threshold: f64,
}

impl Default for NbaWeights {
    fn default() -> Self {
        Self {
            urgency: 30.0,
            success_prob: 20.0,
            impact: 25.0,
            recency: 10.0,
            readiness: 15.0,
            prerequisite_threshold: 0.75,
        }
    }
}

impl NbaWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("urgency", self.urgency),
            ("success_prob", self.success_prob),
            ("impact", self.impact),
            ("recency", self.recency),
            ("readiness", self.readiness),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError(format!(
                    "{name} must be a finite non-negative number (got {value})"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.prerequisite_threshold) {
            return Err(ConfigError(format!(
                "prerequisite_threshold must be within [0, 1] (got {})",
                self.prerequisite_threshold
            )));
        }

        Ok(())
    }

    /// Sum of all component weights (the best achievable score)
    pub fn max_score(&self) -> f64 {
        self.urgency + self.success_prob + self.impact + self.recency + self.readiness
    }
}
