use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// Signal tables used by the effort estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortRules {
    /// Categories that add +2 (compared case-insensitively)
    pub high_effort_categories: Vec<String>,

    /// Categories that subtract 1
    pub low_effort_categories: Vec<String>,

    /// Description keywords that add +1 (first match wins)
    pub complexity_keywords: Vec<String>,

    /// Description keywords that subtract 1 (first match wins)
    pub simplicity_keywords: Vec<String>,

    /// Descriptions longer than this many characters add +1
    pub long_description_threshold: usize,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for EffortRules {
    fn default() -> Self {
        Self {
            high_effort_categories: strings(&[
                "replication",
                "serialization",
                "streaming",
                "optimization",
                "networking",
                "persistence",
            ]),
            low_effort_categories: strings(&["data", "config", "tags", "debug", "logging", "cvars"]),
            complexity_keywords: strings(&[
                "multi-phase",
                "replicated",
                "async",
                "pipeline",
                "subsystem",
                "multithreaded",
                "prediction",
                "interpolation",
                "state machine",
            ]),
            simplicity_keywords: strings(&[
                "simple",
                "wrapper",
                "getter",
                "toggle",
                "flag",
                "alias",
                "constant",
            ]),
            long_description_threshold: 80,
        }
    }
}

impl EffortRules {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.long_description_threshold == 0 {
            return Err(GraphError::InvalidConfig(
                "long_description_threshold must be > 0".to_string(),
            ));
        }

        let lists = [
            ("high_effort_categories", &self.high_effort_categories),
            ("low_effort_categories", &self.low_effort_categories),
            ("complexity_keywords", &self.complexity_keywords),
            ("simplicity_keywords", &self.simplicity_keywords),
        ];
        for (name, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(GraphError::InvalidConfig(format!(
                    "{name} must not contain empty entries"
                )));
            }
        }

        if let Some(overlap) = self
            .high_effort_categories
            .iter()
            .find(|c| contains_ignore_case(&self.low_effort_categories, c))
        {
            return Err(GraphError::InvalidConfig(format!(
                "category '{overlap}' is listed as both high and low effort"
            )));
        }

        Ok(())
    }

    pub(crate) fn is_high_effort(&self, category: &str) -> bool {
        contains_ignore_case(&self.high_effort_categories, category)
    }

    pub(crate) fn is_low_effort(&self, category: &str) -> bool {
        contains_ignore_case(&self.low_effort_categories, category)
    }
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    let needle = needle.trim();
    values.iter().any(|v| v.trim().eq_ignore_ascii_case(needle))
}
