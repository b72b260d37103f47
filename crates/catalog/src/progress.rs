use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Checklist completion for every module, as tracked by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistProgress {
    /// module id -> checklist item id -> checked
    #[serde(default)]
    pub checked: BTreeMap<String, BTreeMap<String, bool>>,

    /// module id -> total checklist size
    #[serde(default)]
    pub totals: BTreeMap<String, usize>,
}

impl ChecklistProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json_str(&input)
    }

    pub fn is_checked(&self, module_id: &str, item_id: &str) -> bool {
        self.checked
            .get(module_id)
            .and_then(|items| items.get(item_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_checked(&mut self, module_id: &str, item_id: &str, checked: bool) {
        self.checked
            .entry(module_id.to_string())
            .or_default()
            .insert(item_id.to_string(), checked);
    }

    pub fn set_total(&mut self, module_id: &str, total: usize) {
        self.totals.insert(module_id.to_string(), total);
    }

    pub fn total(&self, module_id: &str) -> Option<usize> {
        self.totals.get(module_id).copied()
    }

    pub fn checked_count(&self, module_id: &str) -> usize {
        self.checked
            .get(module_id)
            .map(|items| items.values().filter(|&&checked| checked).count())
            .unwrap_or(0)
    }

    /// Completion ratio in `[0, 1]` against the recorded total
    pub fn completion(&self, module_id: &str) -> f64 {
        self.completion_with_total(module_id, self.total(module_id).unwrap_or(0))
    }

    /// Completion ratio in `[0, 1]` against an explicit total
    pub fn completion_with_total(&self, module_id: &str, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        (self.checked_count(module_id) as f64 / total as f64).clamp(0.0, 1.0)
    }
}
