use crate::error::{CatalogError, Result};
use crate::key::{FeatureKey, KEY_SEPARATOR};
use crate::types::{ChecklistItem, Feature, FeatureDef, Module};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Module as authored in a catalog file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
    pub id: String,

    /// Display label (defaults to the id)
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub prerequisites: Vec<String>,

    #[serde(default)]
    pub features: Vec<FeatureDef>,

    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl ModuleDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn prerequisites<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_feature(mut self, feature: FeatureDef) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_checklist_item(mut self, item: ChecklistItem) -> Self {
        self.checklist.push(item);
        self
    }
}

/// Whole catalog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDef {
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
}

impl CatalogDef {
    pub fn with_module(mut self, module: ModuleDef) -> Self {
        self.modules.push(module);
        self
    }
}

/// Immutable feature catalog with key and module indices
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: Vec<Module>,
    module_index: HashMap<String, usize>,

    /// Features in module order, then declaration order
    features: Vec<Feature>,
    feature_index: HashMap<FeatureKey, usize>,
}

impl Catalog {
    /// Build a catalog from its authored definition
    pub fn from_def(def: CatalogDef) -> Result<Self> {
        let mut catalog = Catalog::default();

        for module_def in def.modules {
            validate_identifier("module id", &module_def.id)?;
            if catalog.module_index.contains_key(&module_def.id) {
                return Err(CatalogError::DuplicateModule(module_def.id));
            }

            let module_id = module_def.id.clone();
            for feature_def in module_def.features {
                validate_identifier("feature name", &feature_def.name)?;
                let feature = Feature::from_def(&module_id, feature_def);
                match catalog.feature_index.get(&feature.key) {
                    Some(&idx) => {
                        log::warn!("Duplicate feature '{}': later definition wins", feature.key);
                        catalog.features[idx] = feature;
                    }
                    None => {
                        catalog
                            .feature_index
                            .insert(feature.key.clone(), catalog.features.len());
                        catalog.features.push(feature);
                    }
                }
            }

            let label = if module_def.label.trim().is_empty() {
                module_id.clone()
            } else {
                module_def.label
            };
            catalog
                .module_index
                .insert(module_id.clone(), catalog.modules.len());
            catalog.modules.push(Module {
                id: module_id,
                label,
                prerequisites: module_def.prerequisites,
                checklist: module_def.checklist,
            });
        }

        log::debug!(
            "Built catalog: {} modules, {} features",
            catalog.modules.len(),
            catalog.features.len()
        );

        Ok(catalog)
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let def: CatalogDef = toml::from_str(input)?;
        Self::from_def(def)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let def: CatalogDef = serde_json::from_str(input)?;
        Self::from_def(def)
    }

    /// Load a catalog file, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&input),
            Some("json") => Self::from_json_str(&input),
            other => Err(CatalogError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn feature(&self, key: &FeatureKey) -> Option<&Feature> {
        self.feature_index.get(key).map(|&idx| &self.features[idx])
    }

    pub fn contains(&self, key: &FeatureKey) -> bool {
        self.feature_index.contains_key(key)
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.module_index.get(module_id).map(|&idx| &self.modules[idx])
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// All features in deterministic catalog order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn features_in<'a>(&'a self, module_id: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features
            .iter()
            .filter(move |feature| feature.module_id() == module_id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn validate_identifier(kind: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() || value.contains(KEY_SEPARATOR) {
        return Err(CatalogError::invalid_identifier(kind, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [[modules]]
        id = "core"
        label = "Core"

        [[modules.features]]
        name = "Math"
        category = "Data"

        [[modules]]
        id = "physics"
        prerequisites = ["core"]

        [[modules.features]]
        name = "Shapes"
        category = "Simulation"
        depends_on = ["core::Math"]

        [[modules.features]]
        name = "Collision"
        category = "Simulation"
        description = "Broadphase and narrowphase"
        depends_on = ["Shapes"]

        [[modules.checklist]]
        id = "collide"
        label = "Collision queries"
        features = ["Collision"]
    "#;

    #[test]
    fn loads_toml_catalog_in_declaration_order() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let keys: Vec<&str> = catalog.features().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["core::Math", "physics::Shapes", "physics::Collision"]);

        let physics = catalog.module("physics").unwrap();
        assert_eq!(physics.label, "physics");
        assert_eq!(physics.prerequisites, vec!["core".to_string()]);
        assert_eq!(physics.checklist.len(), 1);
        assert_eq!(catalog.features_in("physics").count(), 2);
    }

    #[test]
    fn later_duplicate_feature_wins() {
        let catalog = Catalog::from_def(
            CatalogDef::default().with_module(
                ModuleDef::new("ui")
                    .with_feature(FeatureDef::new("Button").category("Widgets"))
                    .with_feature(FeatureDef::new("Button").category("Input")),
            ),
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        let key = FeatureKey::new("ui", "Button");
        assert_eq!(catalog.feature(&key).unwrap().category, "Input");
    }

    #[test]
    fn rejects_duplicate_modules_and_bad_identifiers() {
        let dup = CatalogDef::default()
            .with_module(ModuleDef::new("ui"))
            .with_module(ModuleDef::new("ui"));
        assert!(matches!(
            Catalog::from_def(dup),
            Err(CatalogError::DuplicateModule(_))
        ));

        let bad = CatalogDef::default()
            .with_module(ModuleDef::new("ui").with_feature(FeatureDef::new("a::b")));
        assert!(matches!(
            Catalog::from_def(bad),
            Err(CatalogError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn loads_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.modules().len(), 2);

        let yaml = dir.path().join("catalog.yaml");
        std::fs::write(&yaml, "modules: []").unwrap();
        assert!(matches!(
            Catalog::load(&yaml),
            Err(CatalogError::UnsupportedFormat(_))
        ));
    }
}
