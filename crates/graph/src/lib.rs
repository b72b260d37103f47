//! # Planner Graph
//!
//! Dependency analysis and implementation planning over a feature catalog.
//!
//! ## Architecture
//!
//! ```text
//! Catalog
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Resolve bare / qualified references
//!     │      ├─ Direct deps + same-module transitive chain
//!     │      └─ FeatureGraph (petgraph, dependent -> dependency)
//!     │
//!     ├──> Blocker Evaluator   (snapshot -> BlockerInfo per feature)
//!     ├──> Impact Scorer       (snapshot -> unlock cascade per feature)
//!     ├──> Effort Estimator    (feature -> EffortEstimate)
//!     │
//!     └──> Planner
//!            ├─ Kahn layering over the unimplemented subgraph
//!            ├─ Order layers by impact, then key
//!            └─ Filter post-pass, aggregate counts
//! ```
//!
//! Everything here is a pure function of the catalog and the snapshot passed
//! in. Nothing snapshot-derived is cached between calls, so a single
//! [`Planner`] can serve many snapshots, from many threads.

mod blockers;
mod builder;
mod config;
mod effort;
mod error;
mod graph;
mod impact;
mod planner;
mod summary;
mod types;

pub use blockers::compute_blockers;
pub use builder::{resolve_dependencies, GraphBuilder};
pub use config::EffortRules;
pub use effort::{estimate_effort, estimate_feature_effort};
pub use error::{GraphError, Result};
pub use graph::FeatureGraph;
pub use impact::{compute_impact_scores, ImpactScorer};
pub use planner::{generate_plan, Planner};
pub use summary::module_summaries;
pub use types::{
    BlockerInfo, DependencyInfo, DependencyMap, EffortEstimate, EffortLevel, ImpactScore,
    ImplementationPlan, ModuleSummary, PlanFilter, PlanItem, ResolvedDependency,
};
