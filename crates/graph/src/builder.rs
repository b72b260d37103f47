use crate::graph::{DependencyEdge, FeatureGraph};
use crate::types::{DependencyInfo, DependencyMap, ResolvedDependency};
use planner_catalog::{Catalog, Feature, FeatureKey};
use std::collections::{HashMap, HashSet};

/// Resolve every feature's direct dependencies and transitive chain
pub fn resolve_dependencies(catalog: &Catalog) -> DependencyMap {
    GraphBuilder::new(catalog).resolve()
}

/// Builds dependency structures from a catalog
pub struct GraphBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Build the feature graph (one node per catalog feature)
    pub fn build_graph(&self) -> FeatureGraph {
        let mut graph = FeatureGraph::default();

        // Phase 1: Create nodes for all features
        for feature in self.catalog.features() {
            graph.add_node(feature.key.clone());
        }

        // Phase 2: Add edges for references that name catalog features
        for feature in self.catalog.features() {
            let Some(from_idx) = graph.find_node(&feature.key) else {
                continue;
            };
            for dep in feature.resolved_dependencies() {
                match graph.find_node(&dep) {
                    Some(to_idx) => {
                        let edge = DependencyEdge {
                            cross_module: dep.module_id() != feature.module_id(),
                        };
                        graph.add_edge(from_idx, to_idx, edge);
                    }
                    None => log::debug!("Dangling dependency {} -> {}", feature.key, dep),
                }
            }
        }

        log::debug!(
            "Built feature graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }

    /// Resolve direct deps, chain and depth for every feature
    pub fn resolve(&self) -> DependencyMap {
        let mut depth_memo = HashMap::new();
        let entries = self
            .catalog
            .features()
            .iter()
            .map(|feature| {
                let info = DependencyInfo {
                    deps: self.direct_dependencies(feature),
                    chain: self.chain(feature),
                    depth: self.depth(feature, &mut HashSet::new(), &mut depth_memo).0,
                };
                (feature.key.clone(), info)
            })
            .collect();

        DependencyMap { entries }
    }

    fn resolved(&self, owner: &Feature, key: FeatureKey) -> ResolvedDependency {
        ResolvedDependency {
            name: key.feature_name().to_string(),
            cross_module: key.module_id() != owner.module_id(),
            known: self.catalog.contains(&key),
            key,
        }
    }

    fn direct_dependencies(&self, feature: &Feature) -> Vec<ResolvedDependency> {
        let mut seen = HashSet::new();
        feature
            .resolved_dependencies()
            .filter(|key| seen.insert(key.clone()))
            .map(|key| self.resolved(feature, key))
            .collect()
    }

    /// Depth-first closure; cross-module references are recorded but not followed.
    ///
    /// The root only enters its own chain when a cycle leads back to it, and is
    /// never expanded a second time.
    fn chain(&self, feature: &Feature) -> Vec<ResolvedDependency> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        self.collect_chain(feature, feature, &mut visited, &mut chain);
        chain
    }

    fn collect_chain(
        &self,
        root: &Feature,
        current: &Feature,
        visited: &mut HashSet<FeatureKey>,
        chain: &mut Vec<ResolvedDependency>,
    ) {
        for key in current.resolved_dependencies() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let next = self
                .catalog
                .feature(&key)
                .filter(|dep| dep.key != root.key && dep.module_id() == current.module_id());
            chain.push(self.resolved(root, key));
            if let Some(dep) = next {
                self.collect_chain(root, dep, visited, chain);
            }
        }
    }

    /// Longest same-module path; an edge back onto the current path adds nothing.
    ///
    /// Returns the depth and whether the walk was cut short by the current path.
    /// Cut results depend on where the walk entered a cycle and are never memoized.
    fn depth(
        &self,
        feature: &Feature,
        visiting: &mut HashSet<FeatureKey>,
        memo: &mut HashMap<FeatureKey, usize>,
    ) -> (usize, bool) {
        if let Some(&depth) = memo.get(&feature.key) {
            return (depth, false);
        }
        if !visiting.insert(feature.key.clone()) {
            return (0, true);
        }

        let mut depth = 0;
        let mut cut = false;
        for key in feature.resolved_dependencies() {
            if key.module_id() != feature.module_id() {
                continue;
            }
            if visiting.contains(&key) {
                cut = true;
                continue;
            }
            if let Some(dep) = self.catalog.feature(&key) {
                let (dep_depth, dep_cut) = self.depth(dep, visiting, memo);
                cut |= dep_cut;
                depth = depth.max(1 + dep_depth);
            }
        }

        visiting.remove(&feature.key);
        if !cut {
            memo.insert(feature.key.clone(), depth);
        }
        (depth, cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_catalog::{CatalogDef, FeatureDef, ModuleDef};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn catalog(modules: Vec<ModuleDef>) -> Catalog {
        Catalog::from_def(CatalogDef { modules }).unwrap()
    }

    fn keys<'a>(deps: impl Iterator<Item = &'a FeatureKey>) -> Vec<&'a str> {
        deps.map(FeatureKey::as_str).collect()
    }

    #[test]
    fn resolves_bare_and_cross_module_references() {
        let catalog = catalog(vec![
            ModuleDef::new("core").with_feature(FeatureDef::new("Math")),
            ModuleDef::new("physics")
                .with_feature(FeatureDef::new("Shapes").depends_on(["core::Math"]))
                .with_feature(FeatureDef::new("Collision").depends_on(["Shapes", "core::Math"])),
        ]);
        let map = resolve_dependencies(&catalog);
        let collision = map.get(&FeatureKey::new("physics", "Collision")).unwrap();

        assert_eq!(keys(collision.dep_keys()), vec!["physics::Shapes", "core::Math"]);
        assert!(collision.deps[1].cross_module);
        assert_eq!(collision.deps[0].name, "Shapes");
        assert_eq!(keys(collision.chain_keys()), vec!["physics::Shapes", "core::Math"]);
        assert_eq!(collision.depth, 1);
    }

    #[test]
    fn follows_same_module_edges_only() {
        let catalog = catalog(vec![
            ModuleDef::new("core")
                .with_feature(FeatureDef::new("Math").depends_on(["Alloc"]))
                .with_feature(FeatureDef::new("Alloc")),
            ModuleDef::new("render")
                .with_feature(FeatureDef::new("Mesh").depends_on(["core::Math"]))
                .with_feature(FeatureDef::new("Lod").depends_on(["Mesh"]))
                .with_feature(FeatureDef::new("Impostor").depends_on(["Lod"])),
        ]);
        let map = resolve_dependencies(&catalog);
        let impostor = map.get(&FeatureKey::new("render", "Impostor")).unwrap();

        // core::Alloc sits behind a cross-module edge and is not reached
        assert_eq!(
            keys(impostor.chain_keys()),
            vec!["render::Lod", "render::Mesh", "core::Math"]
        );
        assert_eq!(impostor.depth, 2);
    }

    #[test]
    fn tolerates_cycles() {
        let catalog = catalog(vec![ModuleDef::new("m")
            .with_feature(FeatureDef::new("A").depends_on(["B"]))
            .with_feature(FeatureDef::new("B").depends_on(["C"]))
            .with_feature(FeatureDef::new("C").depends_on(["A"]))
            .with_feature(FeatureDef::new("Self").depends_on(["Self"]))]);
        let map = resolve_dependencies(&catalog);

        let a = map.get(&FeatureKey::new("m", "A")).unwrap();
        assert_eq!(keys(a.chain_keys()), vec!["m::B", "m::C", "m::A"]);
        assert_eq!(a.depth, 2);

        let own = map.get(&FeatureKey::new("m", "Self")).unwrap();
        assert_eq!(keys(own.dep_keys()), vec!["m::Self"]);
        assert_eq!(keys(own.chain_keys()), vec!["m::Self"]);
        assert_eq!(own.depth, 0);
    }

    #[test]
    fn cycle_depth_does_not_depend_on_declaration_order() {
        let defs = [
            FeatureDef::new("A").depends_on(["B"]),
            FeatureDef::new("B").depends_on(["C"]),
            FeatureDef::new("C").depends_on(["A"]),
            FeatureDef::new("Tail").depends_on(["A"]),
        ];

        let depths = |order: [usize; 4]| -> Vec<usize> {
            let module = order
                .into_iter()
                .fold(ModuleDef::new("m"), |module, idx| module.with_feature(defs[idx].clone()));
            let map = resolve_dependencies(&catalog(vec![module]));
            ["A", "B", "C", "Tail"]
                .iter()
                .map(|name| map.get(&FeatureKey::new("m", name)).unwrap().depth)
                .collect()
        };

        let declared = depths([0, 1, 2, 3]);
        assert_eq!(declared, vec![2, 2, 2, 3]);
        assert_eq!(depths([2, 1, 0, 3]), declared);
        assert_eq!(depths([3, 1, 2, 0]), declared);
        assert_eq!(depths([1, 3, 0, 2]), declared);
    }

    #[test]
    fn feature_without_dependencies_is_empty() {
        let catalog = catalog(vec![ModuleDef::new("m").with_feature(FeatureDef::new("A"))]);
        let map = resolve_dependencies(&catalog);
        assert_eq!(map.get(&FeatureKey::new("m", "A")), Some(&DependencyInfo::default()));
    }

    #[test]
    fn marks_dangling_references_unknown() {
        let catalog = catalog(vec![ModuleDef::new("m")
            .with_feature(FeatureDef::new("A").depends_on(["Ghost", "other::Thing"]))]);
        let map = resolve_dependencies(&catalog);
        let a = map.get(&FeatureKey::new("m", "A")).unwrap();
        assert!(a.deps.iter().all(|dep| !dep.known));

        let graph = GraphBuilder::new(&catalog).build_graph();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn resolving_twice_is_structurally_equal() {
        let catalog = catalog(vec![ModuleDef::new("m")
            .with_feature(FeatureDef::new("A").depends_on(["B"]))
            .with_feature(FeatureDef::new("B"))]);
        assert_eq!(resolve_dependencies(&catalog), resolve_dependencies(&catalog));
    }

    fn arbitrary_catalog() -> impl Strategy<Value = Catalog> {
        let names = ["A", "B", "C", "D", "E", "F"];
        proptest::collection::vec(
            (0usize..2, proptest::collection::vec((0usize..2, 0usize..6), 0..4)),
            6,
        )
        .prop_map(move |specs| {
            let mut modules = vec![ModuleDef::new("m0"), ModuleDef::new("m1")];
            for (idx, (module, deps)) in specs.into_iter().enumerate() {
                let refs: Vec<String> = deps
                    .into_iter()
                    .map(|(dep_module, dep)| {
                        if dep_module == module {
                            names[dep].to_string()
                        } else {
                            format!("m{dep_module}::{}", names[dep])
                        }
                    })
                    .collect();
                modules[module]
                    .features
                    .push(FeatureDef::new(names[idx]).depends_on(refs));
            }
            Catalog::from_def(CatalogDef { modules }).unwrap()
        })
    }

    proptest! {
        #[test]
        fn proptest_chain_is_superset_of_deps(catalog in arbitrary_catalog()) {
            let map = resolve_dependencies(&catalog);
            for (key, info) in map.iter() {
                prop_assert!(info.chain.len() >= info.deps.len());
                let chain: HashSet<&FeatureKey> = info.chain_keys().collect();
                prop_assert_eq!(chain.len(), info.chain.len(), "chain of {} has duplicates", key);
                for dep in info.dep_keys() {
                    prop_assert!(chain.contains(dep));
                }
            }
        }
    }
}
