use crate::error::{GraphError, Result};
use planner_catalog::{FeatureKey, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Dependency reference resolved to a concrete key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDependency {
    pub key: FeatureKey,

    /// Target feature name, for display
    pub name: String,

    /// True when the reference names another module
    pub cross_module: bool,

    /// False when the key does not name a catalog feature
    pub known: bool,
}

/// Direct and transitive dependencies of one feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    /// Direct dependencies in declaration order, de-duplicated
    pub deps: Vec<ResolvedDependency>,

    /// Transitive closure (superset of `deps`); only same-module edges are followed
    pub chain: Vec<ResolvedDependency>,

    /// Longest same-module dependency path; cycles add nothing
    pub depth: usize,
}

impl DependencyInfo {
    pub fn dep_keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.deps.iter().map(|dep| &dep.key)
    }

    pub fn chain_keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.chain.iter().map(|dep| &dep.key)
    }
}

/// Resolved dependency data for a whole catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyMap {
    pub(crate) entries: BTreeMap<FeatureKey, DependencyInfo>,
}

impl DependencyMap {
    pub fn get(&self, key: &FeatureKey) -> Option<&DependencyInfo> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, &DependencyInfo)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Blocked state of one feature under a specific snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockerInfo {
    pub is_blocked: bool,
    /// Direct dependencies whose status is not `implemented`
    pub blockers: Vec<FeatureKey>,
}

/// How much work implementing one feature would unlock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScore {
    pub direct_unblocks: usize,
    pub transitive_unblocks: usize,
    /// `2 * direct_unblocks + transitive_unblocks`
    pub score: usize,
    /// Dependents unblocked in the first cascade step
    pub direct_dependents: Vec<FeatureKey>,
}

/// Coarse effort bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Trivial,
    Small,
    Medium,
    Large,
}

impl EffortLevel {
    pub const fn minutes(self) -> u32 {
        match self {
            EffortLevel::Trivial => 15,
            EffortLevel::Small => 30,
            EffortLevel::Medium => 60,
            EffortLevel::Large => 120,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EffortLevel::Trivial => "trivial",
            EffortLevel::Small => "small",
            EffortLevel::Medium => "medium",
            EffortLevel::Large => "large",
        }
    }

    pub(crate) fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=0 => EffortLevel::Trivial,
            1..=2 => EffortLevel::Small,
            3..=4 => EffortLevel::Medium,
            _ => EffortLevel::Large,
        }
    }
}

impl fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffortLevel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trivial" => Ok(EffortLevel::Trivial),
            "small" => Ok(EffortLevel::Small),
            "medium" => Ok(EffortLevel::Medium),
            "large" => Ok(EffortLevel::Large),
            _ => Err(GraphError::UnknownEffortLevel(s.to_string())),
        }
    }
}

/// Heuristic effort estimate with its trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortEstimate {
    pub level: EffortLevel,
    pub minutes: u32,
    pub reason: String,
}

impl EffortEstimate {
    pub(crate) fn new(level: EffortLevel, reason: impl Into<String>) -> Self {
        Self {
            level,
            minutes: level.minutes(),
            reason: reason.into(),
        }
    }
}

/// One unimplemented feature in an implementation plan.
///
/// The visualization layer reads `key`, `moduleId`, `category`, `status`,
/// `effort.level`, `impact.score` and `dependsOn`; keep those stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub key: FeatureKey,
    pub module_id: String,
    pub feature_name: String,
    pub category: String,
    pub description: String,
    /// Topological layer within the unimplemented subgraph
    pub depth: usize,
    pub impact: ImpactScore,
    pub effort: EffortEstimate,
    pub depends_on: Vec<FeatureKey>,
    /// Every dependency is implemented in the snapshot
    pub is_ready: bool,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationPlan {
    pub items: Vec<PlanItem>,
    pub total_features: usize,
    pub implemented_count: usize,
    pub remaining_count: usize,
    pub total_effort_minutes: u32,
}

/// Post-pass filter applied to a generated plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFilter {
    pub module_id: Option<String>,
    pub max_effort: Option<EffortLevel>,
    pub min_impact: Option<usize>,
}

impl PlanFilter {
    pub fn module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    pub fn max_effort(mut self, level: EffortLevel) -> Self {
        self.max_effort = Some(level);
        self
    }

    pub fn min_impact(mut self, score: usize) -> Self {
        self.min_impact = Some(score);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.module_id.is_none() && self.max_effort.is_none() && self.min_impact.is_none()
    }

    pub(crate) fn accepts(&self, item: &PlanItem) -> bool {
        if let Some(module_id) = &self.module_id {
            if &item.module_id != module_id {
                return false;
            }
        }
        if let Some(max_effort) = self.max_effort {
            if item.effort.level > max_effort {
                return false;
            }
        }
        if let Some(min_impact) = self.min_impact {
            if item.impact.score < min_impact {
                return false;
            }
        }
        true
    }
}

/// Status breakdown of one module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub module_id: String,
    pub label: String,
    pub total: usize,
    pub implemented: usize,
    pub improved: usize,
    pub partial: usize,
    pub missing: usize,
    pub unknown: usize,
    /// Percentage of features that are `implemented`
    pub completion: f64,
}
