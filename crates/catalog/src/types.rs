use crate::key::FeatureKey;
use serde::{Deserialize, Serialize};

/// Feature as authored in a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    /// Feature name, unique within its module
    pub name: String,

    /// Free-text grouping (e.g. "Replication", "Config")
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    /// Dependency references: bare names stay in the module, `mod::Name` crosses modules
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<String>,
}

impl FeatureDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            description: String::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn depends_on<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = references.into_iter().map(Into::into).collect();
        self
    }
}

/// Feature bound to its owning module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub key: FeatureKey,
    pub category: String,
    pub description: String,
    /// References exactly as declared, in declaration order
    pub depends_on: Vec<String>,
}

impl Feature {
    pub(crate) fn from_def(module_id: &str, def: FeatureDef) -> Self {
        Self {
            key: FeatureKey::new(module_id, &def.name),
            category: def.category,
            description: def.description,
            depends_on: def.depends_on,
        }
    }

    pub fn module_id(&self) -> &str {
        self.key.module_id()
    }

    pub fn name(&self) -> &str {
        self.key.feature_name()
    }

    /// Dependency references resolved to fully-qualified keys, declaration order kept
    pub fn resolved_dependencies(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.depends_on
            .iter()
            .map(move |reference| FeatureKey::resolve(self.module_id(), reference))
    }

    /// Number of references resolving into another module
    pub fn cross_module_dependency_count(&self) -> usize {
        self.resolved_dependencies()
            .filter(|key| key.module_id() != self.module_id())
            .count()
    }
}

/// One step of a module's implementation checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// Catalog features this step delivers (bare or qualified references)
    #[serde(default)]
    pub features: Vec<String>,
}

impl ChecklistItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            features: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn features<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = references.into_iter().map(Into::into).collect();
        self
    }
}

/// Module metadata (features are held by the catalog)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub label: String,
    /// Modules that should be substantially complete before this one is prioritized
    pub prerequisites: Vec<String>,
    /// Ordered implementation checklist
    pub checklist: Vec<ChecklistItem>,
}

impl Module {
    /// Features linked to a checklist item, resolved against this module
    pub fn checklist_features<'a>(
        &'a self,
        item: &'a ChecklistItem,
    ) -> impl Iterator<Item = FeatureKey> + 'a {
        item.features
            .iter()
            .map(move |reference| FeatureKey::resolve(&self.id, reference))
    }
}
