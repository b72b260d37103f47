use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between module id and feature name in a fully-qualified key
pub const KEY_SEPARATOR: &str = "::";

/// Canonical identity of a feature: `"<module>::<feature>"`.
///
/// The canonical string is stored once and the split point remembered, so
/// ordering, hashing and equality all follow the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureKey {
    canonical: String,
    split: usize,
}

impl FeatureKey {
    /// Build a key from its two halves.
    pub fn new(module_id: &str, feature_name: &str) -> Self {
        Self {
            canonical: format!("{module_id}{KEY_SEPARATOR}{feature_name}"),
            split: module_id.len(),
        }
    }

    /// Parse a fully-qualified key, splitting on the first separator.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let Some((module, feature)) = value.split_once(KEY_SEPARATOR) else {
            return Err(CatalogError::InvalidKey(value.to_string()));
        };
        if module.is_empty() || feature.is_empty() {
            return Err(CatalogError::InvalidKey(value.to_string()));
        }
        Ok(Self::new(module, feature))
    }

    /// Resolve a dependency reference declared by a feature of `owning_module`.
    ///
    /// A bare name stays inside the owning module; a reference that already
    /// carries the separator is taken as-is.
    pub fn resolve(owning_module: &str, reference: &str) -> Self {
        let reference = reference.trim();
        match reference.split_once(KEY_SEPARATOR) {
            Some((module, feature)) if !module.is_empty() && !feature.is_empty() => {
                Self::new(module, feature)
            }
            _ => Self::new(owning_module, reference),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.canonical[..self.split]
    }

    pub fn feature_name(&self) -> &str {
        &self.canonical[self.split + KEY_SEPARATOR.len()..]
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn into_string(self) -> String {
        self.canonical
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for FeatureKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.canonical
    }
}
