use crate::config::NbaWeights;
use planner_catalog::{ChecklistProgress, FeatureKey, Module, StatusSnapshot};
use planner_graph::{BlockerInfo, EffortLevel, ImpactScore, Planner};
use serde::Serialize;
use std::collections::BTreeMap;

/// Success likelihood used when a step delivers no catalog feature
const DEFAULT_SUCCESS: f64 = 0.65;

/// Impact score at which the impact component saturates
const IMPACT_SATURATION: f64 = 10.0;

/// Per-component contributions; they sum to the unrounded score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub urgency: f64,
    pub success_prob: f64,
    pub impact: f64,
    pub recency: f64,
    pub readiness: f64,
}

impl Breakdown {
    pub fn total(&self) -> f64 {
        self.urgency + self.success_prob + self.impact + self.recency + self.readiness
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub module_id: String,
    /// Checklist item id
    pub item: String,
    pub label: String,
    /// Catalog features the item delivers
    pub features: Vec<FeatureKey>,
    /// Breakdown total rounded to two decimals
    pub score: f64,
    pub breakdown: Breakdown,
}

/// Rank the unchecked checklist items of `module_id`
pub fn compute_nba(
    planner: &Planner,
    module_id: &str,
    progress: &ChecklistProgress,
    statuses: Option<&StatusSnapshot>,
    weights: &NbaWeights,
) -> Vec<Recommendation> {
    NbaScorer::new(planner, weights).compute(module_id, progress, statuses)
}

/// Highest-ranked recommendation, if any
pub fn top_recommendation(
    planner: &Planner,
    module_id: &str,
    progress: &ChecklistProgress,
    statuses: Option<&StatusSnapshot>,
    weights: &NbaWeights,
) -> Option<Recommendation> {
    NbaScorer::new(planner, weights).top(module_id, progress, statuses)
}

/// Next-best-action scorer over one planner
pub struct NbaScorer<'a> {
    planner: &'a Planner,
    weights: &'a NbaWeights,
}

/// Snapshot-derived data, built once per call
struct ScoringContext<'s> {
    snapshot: &'s StatusSnapshot,
    impact: BTreeMap<FeatureKey, ImpactScore>,
    blockers: Option<BTreeMap<FeatureKey, BlockerInfo>>,
    prerequisites: f64,
    last_checked: Option<usize>,
}

impl<'a> NbaScorer<'a> {
    pub fn new(planner: &'a Planner, weights: &'a NbaWeights) -> Self {
        Self { planner, weights }
    }

    pub fn top(
        &self,
        module_id: &str,
        progress: &ChecklistProgress,
        statuses: Option<&StatusSnapshot>,
    ) -> Option<Recommendation> {
        self.compute(module_id, progress, statuses).into_iter().next()
    }

    pub fn compute(
        &self,
        module_id: &str,
        progress: &ChecklistProgress,
        statuses: Option<&StatusSnapshot>,
    ) -> Vec<Recommendation> {
        let Some(module) = self.planner.catalog().module(module_id) else {
            log::debug!("NBA: unknown module '{module_id}'");
            return Vec::new();
        };
        if module.checklist.is_empty() {
            return Vec::new();
        }

        let empty = StatusSnapshot::new();
        let snapshot = statuses.unwrap_or(&empty);
        let ctx = ScoringContext {
            snapshot,
            impact: self.planner.impact_scores(snapshot),
            blockers: statuses.map(|s| self.planner.blockers(s)),
            prerequisites: self.prerequisite_factor(module, progress),
            last_checked: module
                .checklist
                .iter()
                .rposition(|item| progress.is_checked(&module.id, &item.id)),
        };

        let total = module.checklist.len();
        let mut ranked: Vec<(usize, Recommendation)> = module
            .checklist
            .iter()
            .enumerate()
            .filter(|(_, item)| !progress.is_checked(&module.id, &item.id))
            .map(|(index, item)| {
                let features: Vec<FeatureKey> = module
                    .checklist_features(item)
                    .filter(|key| self.planner.catalog().contains(key))
                    .collect();
                let breakdown = self.breakdown(index, total, &features, &ctx);
                let recommendation = Recommendation {
                    module_id: module.id.clone(),
                    item: item.id.clone(),
                    label: item.label.clone(),
                    features,
                    score: round2(breakdown.total()),
                    breakdown,
                };
                (index, recommendation)
            })
            .collect();

        ranked.sort_by(|(ia, a), (ib, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ia.cmp(ib))
        });

        log::debug!(
            "NBA for '{}': {} of {} items outstanding",
            module.id,
            ranked.len(),
            total
        );

        ranked.into_iter().map(|(_, rec)| rec).collect()
    }

    fn breakdown(
        &self,
        index: usize,
        total: usize,
        features: &[FeatureKey],
        ctx: &ScoringContext<'_>,
    ) -> Breakdown {
        let w = self.weights;

        let urgency = w.urgency * (total - index) as f64 / total as f64;

        let success_prob = w.success_prob * self.success_likelihood(features);

        let unlocked: usize = features
            .iter()
            .filter(|key| !ctx.snapshot.is_implemented(key))
            .filter_map(|key| ctx.impact.get(key))
            .map(|score| score.score)
            .sum();
        let impact = w.impact * (unlocked as f64 / IMPACT_SATURATION).min(1.0);

        let distance = match ctx.last_checked {
            Some(last) if index > last => index - last - 1,
            _ => index,
        };
        let recency = w.recency / (1.0 + distance as f64);

        let feature_ready = match &ctx.blockers {
            Some(blockers) if !features.is_empty() => {
                let ready = features
                    .iter()
                    .filter(|key| !blockers.get(*key).map(|b| b.is_blocked).unwrap_or(false))
                    .count();
                ready as f64 / features.len() as f64
            }
            _ => 1.0,
        };
        let readiness = w.readiness * ctx.prerequisites * feature_ready;

        Breakdown {
            urgency,
            success_prob,
            impact,
            recency,
            readiness,
        }
    }

    fn success_likelihood(&self, features: &[FeatureKey]) -> f64 {
        if features.is_empty() {
            return DEFAULT_SUCCESS;
        }
        let sum: f64 = features
            .iter()
            .map(|key| match self.planner.effort(key).level {
                EffortLevel::Trivial => 1.0,
                EffortLevel::Small => 0.85,
                EffortLevel::Medium => 0.65,
                EffortLevel::Large => 0.4,
            })
            .sum();
        sum / features.len() as f64
    }

    /// Fraction of prerequisite modules at or above the completion threshold
    fn prerequisite_factor(&self, module: &Module, progress: &ChecklistProgress) -> f64 {
        if module.prerequisites.is_empty() {
            return 1.0;
        }
        let catalog = self.planner.catalog();
        let satisfied = module
            .prerequisites
            .iter()
            .filter(|prereq| {
                let total = progress.total(prereq).unwrap_or_else(|| {
                    catalog
                        .module(prereq)
                        .map(|m| m.checklist.len())
                        .unwrap_or(0)
                });
                progress.completion_with_total(prereq, total) >= self.weights.prerequisite_threshold
            })
            .count();
        satisfied as f64 / module.prerequisites.len() as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
