use crate::types::ModuleSummary;
use planner_catalog::{Catalog, Status, StatusSnapshot};

/// Per-module status breakdown, in catalog module order
pub fn module_summaries(catalog: &Catalog, snapshot: &StatusSnapshot) -> Vec<ModuleSummary> {
    catalog
        .modules()
        .iter()
        .map(|module| {
            let mut summary = ModuleSummary {
                module_id: module.id.clone(),
                label: module.label.clone(),
                total: 0,
                implemented: 0,
                improved: 0,
                partial: 0,
                missing: 0,
                unknown: 0,
                completion: 0.0,
            };
            for feature in catalog.features_in(&module.id) {
                summary.total += 1;
                match snapshot.get(&feature.key) {
                    Status::Implemented => summary.implemented += 1,
                    Status::Improved => summary.improved += 1,
                    Status::Partial => summary.partial += 1,
                    Status::Missing => summary.missing += 1,
                    Status::Unknown => summary.unknown += 1,
                }
            }
            if summary.total > 0 {
                summary.completion = summary.implemented as f64 * 100.0 / summary.total as f64;
            }
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_catalog::{CatalogDef, FeatureDef, FeatureKey, ModuleDef};

    #[test]
    fn counts_each_status_per_module() {
        let catalog = Catalog::from_def(
            CatalogDef::default()
                .with_module(
                    ModuleDef::new("audio")
                        .label("Audio")
                        .with_feature(FeatureDef::new("Mixer"))
                        .with_feature(FeatureDef::new("Voices"))
                        .with_feature(FeatureDef::new("Reverb"))
                        .with_feature(FeatureDef::new("Hrtf")),
                )
                .with_module(ModuleDef::new("empty")),
        )
        .unwrap();
        let snapshot = StatusSnapshot::new()
            .with(FeatureKey::new("audio", "Mixer"), Status::Implemented)
            .with(FeatureKey::new("audio", "Voices"), Status::Improved)
            .with(FeatureKey::new("audio", "Reverb"), Status::Missing);

        let summaries = module_summaries(&catalog, &snapshot);
        assert_eq!(summaries.len(), 2);

        let audio = &summaries[0];
        assert_eq!(audio.label, "Audio");
        assert_eq!(audio.total, 4);
        assert_eq!(audio.implemented, 1);
        assert_eq!(audio.improved, 1);
        assert_eq!(audio.missing, 1);
        assert_eq!(audio.unknown, 1);
        assert!((audio.completion - 25.0).abs() < 1e-9);

        assert_eq!(summaries[1].total, 0);
        assert_eq!(summaries[1].completion, 0.0);
    }
}
