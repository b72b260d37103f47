use crate::builder::GraphBuilder;
use crate::graph::FeatureGraph;
use crate::types::{DependencyMap, ImpactScore};
use planner_catalog::{Catalog, FeatureKey, StatusSnapshot};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Score every unimplemented catalog feature against `snapshot`
pub fn compute_impact_scores(
    catalog: &Catalog,
    snapshot: &StatusSnapshot,
) -> BTreeMap<FeatureKey, ImpactScore> {
    let builder = GraphBuilder::new(catalog);
    let graph = builder.build_graph();
    let dependencies = builder.resolve();
    ImpactScorer::new(&graph, &dependencies).score_all(&snapshot.implemented_keys())
}

/// Unlock-cascade scorer over one graph.
///
/// Holds only borrowed, catalog-derived data; the implemented set is passed to
/// each call and nothing derived from it is retained.
pub struct ImpactScorer<'a> {
    graph: &'a FeatureGraph,
    dependencies: &'a DependencyMap,
}

impl<'a> ImpactScorer<'a> {
    pub fn new(graph: &'a FeatureGraph, dependencies: &'a DependencyMap) -> Self {
        Self {
            graph,
            dependencies,
        }
    }

    /// Score every feature not in `implemented`
    pub fn score_all(&self, implemented: &HashSet<FeatureKey>) -> BTreeMap<FeatureKey, ImpactScore> {
        let scores: BTreeMap<FeatureKey, ImpactScore> = self
            .graph
            .keys()
            .filter(|key| !implemented.contains(*key))
            .map(|key| (key.clone(), self.score(key, implemented)))
            .collect();

        log::debug!("Impact: scored {} unimplemented features", scores.len());
        scores
    }

    /// Breadth-first cascade seeded with `implemented ∪ {feature}`
    pub fn score(&self, feature: &FeatureKey, implemented: &HashSet<FeatureKey>) -> ImpactScore {
        let mut done: HashSet<&FeatureKey> = implemented.iter().collect();
        done.insert(feature);

        let mut direct: BTreeSet<&FeatureKey> = BTreeSet::new();
        let mut unblocked: HashSet<&FeatureKey> = HashSet::new();
        let mut queue: VecDeque<&FeatureKey> = VecDeque::from([feature]);

        while let Some(current) = queue.pop_front() {
            for dependent in self.graph.dependents_of(current) {
                if done.contains(dependent) {
                    continue;
                }
                if !self.all_dependencies_done(dependent, &done) {
                    continue;
                }
                done.insert(dependent);
                unblocked.insert(dependent);
                if current == feature {
                    direct.insert(dependent);
                }
                queue.push_back(dependent);
            }
        }

        let direct_unblocks = direct.len();
        let transitive_unblocks = unblocked.len();
        ImpactScore {
            direct_unblocks,
            transitive_unblocks,
            score: direct_unblocks * 2 + transitive_unblocks,
            direct_dependents: direct.into_iter().cloned().collect(),
        }
    }

    fn all_dependencies_done(&self, key: &FeatureKey, done: &HashSet<&FeatureKey>) -> bool {
        match self.dependencies.get(key) {
            Some(info) => info.dep_keys().all(|dep| done.contains(dep)),
            None => false,
        }
    }
}
