use planner_catalog::FeatureKey;
use planner_graph::{
    BlockerInfo, DependencyInfo, EffortEstimate, ImpactScore, ImplementationPlan, ModuleSummary,
    ResolvedDependency,
};
use planner_recommend::Recommendation;
use std::fmt::Write;

pub fn render_dependencies(key: &FeatureKey, info: &DependencyInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{key} (depth {})", info.depth);
    let _ = writeln!(out, "  deps:  {}", join_dependencies(&info.deps));
    let _ = writeln!(out, "  chain: {}", join_dependencies(&info.chain));
    out
}

fn join_dependencies(deps: &[ResolvedDependency]) -> String {
    if deps.is_empty() {
        return "-".to_string();
    }
    deps.iter()
        .map(|dep| {
            let mut label = dep.key.to_string();
            if !dep.known {
                label.push_str(" (unknown)");
            } else if dep.cross_module {
                label.push_str(" (cross-module)");
            }
            label
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_blockers<'a>(
    blocked: impl IntoIterator<Item = (&'a FeatureKey, &'a BlockerInfo)>,
) -> String {
    let mut out = String::new();
    for (key, info) in blocked {
        let blockers: Vec<String> = info.blockers.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{key} <- {}", blockers.join(", "));
    }
    if out.is_empty() {
        out.push_str("No blocked features\n");
    }
    out
}

pub fn render_impact<'a>(
    scores: impl IntoIterator<Item = (&'a FeatureKey, &'a ImpactScore)>,
) -> String {
    let mut out = String::new();
    for (key, score) in scores {
        let _ = writeln!(
            out,
            "{:>4}  {key} (direct {}, transitive {})",
            score.score, score.direct_unblocks, score.transitive_unblocks
        );
    }
    out
}

pub fn render_effort(key: &FeatureKey, estimate: &EffortEstimate) -> String {
    format!(
        "{key}: {} (~{} min): {}\n",
        estimate.level, estimate.minutes, estimate.reason
    )
}

pub fn render_plan(plan: &ImplementationPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} remaining of {} ({} implemented), ~{} min",
        plan.remaining_count, plan.total_features, plan.implemented_count, plan.total_effort_minutes
    );
    for (index, item) in plan.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. [layer {}] {} {:<7} impact {:<3} {}",
            index + 1,
            item.depth,
            if item.is_ready { "ready  " } else { "blocked" },
            item.effort.level.as_str(),
            item.impact.score,
            item.key
        );
    }
    out
}

pub fn render_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return "Nothing to recommend\n".to_string();
    }

    let mut out = String::new();
    for (index, rec) in recommendations.iter().enumerate() {
        let label = if rec.label.is_empty() {
            rec.item.as_str()
        } else {
            rec.label.as_str()
        };
        let b = &rec.breakdown;
        let _ = writeln!(out, "{}. {label} [{}] score {:.2}", index + 1, rec.item, rec.score);
        let _ = writeln!(
            out,
            "   urgency {:.2}  success {:.2}  impact {:.2}  recency {:.2}  readiness {:.2}",
            b.urgency, b.success_prob, b.impact, b.recency, b.readiness
        );
    }
    out
}

pub fn render_status(summaries: &[ModuleSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<16} {:>4}/{:<4} {:>6.1}%  (improved {}, partial {}, missing {}, unknown {})",
            summary.module_id,
            summary.implemented,
            summary.total,
            summary.completion,
            summary.improved,
            summary.partial,
            summary.missing,
            summary.unknown
        );
    }
    out
}
