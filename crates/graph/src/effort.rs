use crate::config::EffortRules;
use crate::types::{EffortEstimate, EffortLevel};
use planner_catalog::{Catalog, Feature, FeatureKey};

const BASELINE_REASON: &str = "baseline";
const UNKNOWN_FEATURE_REASON: &str = "unknown feature";

/// Estimate effort for a catalog key.
///
/// Keys that name no catalog feature get the fixed medium / 60 minute default.
pub fn estimate_effort(catalog: &Catalog, key: &FeatureKey, rules: &EffortRules) -> EffortEstimate {
    match catalog.feature(key) {
        Some(feature) => estimate_feature_effort(feature, rules),
        None => EffortEstimate::new(EffortLevel::Medium, UNKNOWN_FEATURE_REASON),
    }
}

/// Score a feature's declared attributes and bucket the result
pub fn estimate_feature_effort(feature: &Feature, rules: &EffortRules) -> EffortEstimate {
    let mut score: i32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    let dep_count = feature.depends_on.len();
    if dep_count >= 3 {
        score += 2;
        reasons.push(format!("{dep_count} deps"));
    } else if dep_count >= 1 {
        score += 1;
        reasons.push(format!("{dep_count} dep{}", if dep_count == 1 { "" } else { "s" }));
    }

    let cross_count = feature.cross_module_dependency_count();
    if cross_count >= 2 {
        score += 2;
        reasons.push(format!("{cross_count} cross-module deps"));
    } else if cross_count == 1 {
        score += 1;
        reasons.push("1 cross-module dep".to_string());
    }

    let category = feature.category.trim();
    if rules.is_high_effort(category) {
        score += 2;
        reasons.push(format!("high-effort category ({category})"));
    } else if rules.is_low_effort(category) {
        score -= 1;
        reasons.push(format!("low-effort category ({category})"));
    }

    let description = feature.description.to_lowercase();
    if let Some(keyword) = first_keyword(&description, &rules.complexity_keywords) {
        score += 1;
        reasons.push(format!("complex: {keyword}"));
    }
    if let Some(keyword) = first_keyword(&description, &rules.simplicity_keywords) {
        score -= 1;
        reasons.push(format!("simple: {keyword}"));
    }

    if feature.description.chars().count() > rules.long_description_threshold {
        score += 1;
        reasons.push("long description".to_string());
    }

    let level = EffortLevel::from_score(score);
    log::trace!("Effort for {}: score {} -> {}", feature.key, score, level);

    let reason = if reasons.is_empty() {
        BASELINE_REASON.to_string()
    } else {
        reasons.join(", ")
    };
    EffortEstimate::new(level, reason)
}

fn first_keyword<'a>(description: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .map(|keyword| keyword.trim())
        .find(|keyword| !keyword.is_empty() && description.contains(&keyword.to_lowercase()))
}
