use crate::blockers::compute_blockers;
use crate::builder::GraphBuilder;
use crate::config::EffortRules;
use crate::effort::{estimate_effort, estimate_feature_effort};
use crate::error::Result;
use crate::graph::FeatureGraph;
use crate::impact::ImpactScorer;
use crate::summary::module_summaries;
use crate::types::{
    BlockerInfo, DependencyInfo, DependencyMap, EffortEstimate, ImpactScore, ImplementationPlan,
    ModuleSummary, PlanFilter, PlanItem,
};
use planner_catalog::{Catalog, FeatureKey, StatusSnapshot};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Generate a plan without keeping a [`Planner`] around
pub fn generate_plan(
    catalog: &Catalog,
    snapshot: &StatusSnapshot,
    filter: &PlanFilter,
    rules: &EffortRules,
) -> ImplementationPlan {
    Planner::new(catalog.clone())
        .with_effort_rules(rules.clone())
        .plan(snapshot, filter)
}

/// Implementation planner bound to one catalog build.
///
/// Dependency resolution and the feature graph are computed once at
/// construction. Every snapshot-dependent result is computed per call.
pub struct Planner {
    catalog: Catalog,
    graph: FeatureGraph,
    dependencies: DependencyMap,
    effort_rules: EffortRules,
}

impl Planner {
    pub fn new(catalog: Catalog) -> Self {
        let builder = GraphBuilder::new(&catalog);
        let graph = builder.build_graph();
        let dependencies = builder.resolve();
        Self {
            catalog,
            graph,
            dependencies,
            effort_rules: EffortRules::default(),
        }
    }

    /// Load a catalog file and build a planner over it
    pub fn load(path: &Path) -> Result<Self> {
        let catalog = Catalog::load(path)?;
        log::debug!("Building planner over {} features from {}", catalog.len(), path.display());
        Ok(Self::new(catalog))
    }

    pub fn with_effort_rules(mut self, rules: EffortRules) -> Self {
        self.effort_rules = rules;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn graph(&self) -> &FeatureGraph {
        &self.graph
    }

    pub fn effort_rules(&self) -> &EffortRules {
        &self.effort_rules
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    pub fn dependency_info(&self, key: &FeatureKey) -> Option<&DependencyInfo> {
        self.dependencies.get(key)
    }

    pub fn blockers(&self, snapshot: &StatusSnapshot) -> BTreeMap<FeatureKey, BlockerInfo> {
        compute_blockers(&self.dependencies, snapshot)
    }

    pub fn impact_scores(&self, snapshot: &StatusSnapshot) -> BTreeMap<FeatureKey, ImpactScore> {
        ImpactScorer::new(&self.graph, &self.dependencies).score_all(&snapshot.implemented_keys())
    }

    pub fn effort(&self, key: &FeatureKey) -> EffortEstimate {
        estimate_effort(&self.catalog, key, &self.effort_rules)
    }

    pub fn module_summaries(&self, snapshot: &StatusSnapshot) -> Vec<ModuleSummary> {
        module_summaries(&self.catalog, snapshot)
    }

    /// Build a dependency-respecting, impact-ordered plan of unimplemented features
    pub fn plan(&self, snapshot: &StatusSnapshot, filter: &PlanFilter) -> ImplementationPlan {
        // Step 1: partition
        let implemented = snapshot.implemented_keys();
        let remaining: HashSet<&FeatureKey> = self
            .catalog
            .features()
            .iter()
            .map(|feature| &feature.key)
            .filter(|key| !implemented.contains(*key))
            .collect();

        // Step 2: impact against the implemented set
        let mut impact = ImpactScorer::new(&self.graph, &self.dependencies).score_all(&implemented);

        // Step 3: layered topological order over the unimplemented subgraph
        let layers = self.layers(&remaining, &impact);

        // Step 4: materialize items
        let mut items = Vec::with_capacity(remaining.len());
        for (depth, layer) in layers.into_iter().enumerate() {
            for key in layer {
                let Some(feature) = self.catalog.feature(key) else {
                    continue;
                };
                let depends_on: Vec<FeatureKey> = self
                    .dependencies
                    .get(key)
                    .map(|info| info.dep_keys().cloned().collect())
                    .unwrap_or_default();
                let is_ready = depends_on.iter().all(|dep| implemented.contains(dep));
                items.push(PlanItem {
                    key: key.clone(),
                    module_id: feature.module_id().to_string(),
                    feature_name: feature.name().to_string(),
                    category: feature.category.clone(),
                    description: feature.description.clone(),
                    depth,
                    impact: impact.remove(key).unwrap_or_default(),
                    effort: estimate_feature_effort(feature, &self.effort_rules),
                    depends_on,
                    is_ready,
                    status: snapshot.get(key),
                });
            }
        }

        // Step 5: filter post-pass and aggregates
        let (total_features, implemented_count) = match &filter.module_id {
            Some(module_id) => {
                let features: Vec<&FeatureKey> = self
                    .catalog
                    .features_in(module_id)
                    .map(|feature| &feature.key)
                    .collect();
                let done = features.iter().filter(|key| implemented.contains(**key)).count();
                (features.len(), done)
            }
            None => (self.catalog.len(), self.catalog.len() - remaining.len()),
        };

        if !filter.is_empty() {
            items.retain(|item| filter.accepts(item));
        }
        let total_effort_minutes: u32 = items.iter().map(|item| item.effort.minutes).sum();

        log::debug!(
            "Plan: {} items ({} remaining in catalog), {} minutes",
            items.len(),
            remaining.len(),
            total_effort_minutes
        );

        ImplementationPlan {
            remaining_count: items.len(),
            items,
            total_features,
            implemented_count,
            total_effort_minutes,
        }
    }

    /// Kahn's algorithm restricted to edges whose endpoints are both unimplemented.
    ///
    /// When every unplaced feature still waits on another, the dependency
    /// cycles that wait on nothing else are released as one layer and layering
    /// resumes, so features downstream of a cycle still follow it.
    fn layers<'k>(
        &'k self,
        remaining: &HashSet<&'k FeatureKey>,
        impact: &BTreeMap<FeatureKey, ImpactScore>,
    ) -> Vec<Vec<&'k FeatureKey>> {
        let mut in_degree: HashMap<&FeatureKey, usize> = remaining
            .iter()
            .map(|&key| {
                let degree = self
                    .graph
                    .dependencies_of(key)
                    .into_iter()
                    .filter(|dep| remaining.contains(dep))
                    .count();
                (key, degree)
            })
            .collect();

        let score = |key: &FeatureKey| impact.get(key).map(|s| s.score).unwrap_or(0);
        let order = |layer: &mut Vec<&FeatureKey>| {
            layer.sort_by(|a, b| score(b).cmp(&score(a)).then_with(|| a.cmp(b)));
        };

        let mut frontier: Vec<&FeatureKey> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&key, _)| key)
            .collect();
        let mut placed: HashSet<&FeatureKey> = HashSet::with_capacity(remaining.len());
        let mut layers = Vec::new();

        while placed.len() < remaining.len() {
            if frontier.is_empty() {
                frontier = self.release_cycles(remaining, &placed);
                log::warn!(
                    "Dependency cycle among unimplemented features: {}",
                    frontier
                        .iter()
                        .map(|key| key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            order(&mut frontier);
            placed.extend(frontier.iter().copied());
            let mut next = Vec::new();
            for &key in &frontier {
                for dependent in self.graph.dependents_of(key) {
                    if placed.contains(dependent) {
                        continue;
                    }
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.push(dependent);
                        }
                    }
                }
            }
            layers.push(std::mem::replace(&mut frontier, next));
        }

        layers
    }

    /// Strongly connected groups of unplaced features that depend on no other
    /// unplaced group
    fn release_cycles<'k>(
        &'k self,
        remaining: &HashSet<&'k FeatureKey>,
        placed: &HashSet<&'k FeatureKey>,
    ) -> Vec<&'k FeatureKey> {
        let mut stalled: Vec<&FeatureKey> = remaining
            .iter()
            .copied()
            .filter(|key| !placed.contains(key))
            .collect();
        stalled.sort();

        let mut subgraph: DiGraph<&FeatureKey, ()> = DiGraph::new();
        let index: HashMap<&FeatureKey, NodeIndex> = stalled
            .iter()
            .map(|&key| (key, subgraph.add_node(key)))
            .collect();
        for &key in &stalled {
            let from = index[key];
            for dep in self.graph.dependencies_of(key) {
                if let Some(&to) = index.get(dep) {
                    subgraph.add_edge(from, to, ());
                }
            }
        }

        let components = tarjan_scc(&subgraph);
        let mut component_of = vec![0usize; subgraph.node_count()];
        for (id, component) in components.iter().enumerate() {
            for idx in component {
                component_of[idx.index()] = id;
            }
        }

        let subgraph = &subgraph;
        let released: Vec<&FeatureKey> = components
            .iter()
            .enumerate()
            .filter(|(id, component)| {
                component.iter().all(|&idx| {
                    subgraph
                        .neighbors(idx)
                        .all(|dep| component_of[dep.index()] == *id)
                })
            })
            .flat_map(|(_, component)| component.iter().map(move |&idx| subgraph[idx]))
            .collect();

        if released.is_empty() {
            stalled
        } else {
            released
        }
    }
}
