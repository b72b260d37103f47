use crate::error::{CatalogError, Result};
use crate::key::FeatureKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Review outcome of a single feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Implemented,
    Improved,
    Partial,
    Missing,
    #[default]
    Unknown,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Implemented,
        Status::Improved,
        Status::Partial,
        Status::Missing,
        Status::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Implemented => "implemented",
            Status::Improved => "improved",
            Status::Partial => "partial",
            Status::Missing => "missing",
            Status::Unknown => "unknown",
        }
    }

    /// Only `implemented` satisfies a dependency
    pub const fn is_implemented(self) -> bool {
        matches!(self, Status::Implemented)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| CatalogError::UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for Status {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

/// Point-in-time mapping from feature key to status.
///
/// Supplied fresh by the caller for every evaluation; missing keys read as
/// [`Status::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot {
    entries: BTreeMap<FeatureKey, Status>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json_str(&input)
    }

    pub fn with(mut self, key: FeatureKey, status: Status) -> Self {
        self.entries.insert(key, status);
        self
    }

    pub fn insert(&mut self, key: FeatureKey, status: Status) -> Option<Status> {
        self.entries.insert(key, status)
    }

    pub fn get(&self, key: &FeatureKey) -> Status {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn is_implemented(&self, key: &FeatureKey) -> bool {
        self.get(key).is_implemented()
    }

    /// Keys whose status is exactly `implemented`
    pub fn implemented_keys(&self) -> HashSet<FeatureKey> {
        self.entries
            .iter()
            .filter(|(_, status)| status.is_implemented())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, Status)> {
        self.entries.iter().map(|(key, status)| (key, *status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(FeatureKey, Status)> for StatusSnapshot {
    fn from_iter<T: IntoIterator<Item = (FeatureKey, Status)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_read_as_unknown() {
        let snapshot = StatusSnapshot::new();
        assert_eq!(snapshot.get(&FeatureKey::new("a", "B")), Status::Unknown);
    }

    #[test]
    fn parses_json_snapshot_case_insensitively() {
        let snapshot = StatusSnapshot::from_json_str(
            r#"{"render::Shadows": "Implemented", "render::Bloom": "partial"}"#,
        )
        .unwrap();
        assert_eq!(
            snapshot.get(&FeatureKey::new("render", "Shadows")),
            Status::Implemented
        );
        assert_eq!(
            snapshot.get(&FeatureKey::new("render", "Bloom")),
            Status::Partial
        );
        assert_eq!(snapshot.implemented_keys().len(), 1);
    }

    #[test]
    fn rejects_unknown_tokens_and_bad_keys() {
        assert!(StatusSnapshot::from_json_str(r#"{"a::B": "done"}"#).is_err());
        assert!(StatusSnapshot::from_json_str(r#"{"nomodule": "missing"}"#).is_err());
    }

    #[test]
    fn improved_does_not_count_as_implemented() {
        let key = FeatureKey::new("net", "Rpc");
        let snapshot = StatusSnapshot::new().with(key.clone(), Status::Improved);
        assert!(!snapshot.is_implemented(&key));
        assert!(snapshot.implemented_keys().is_empty());
    }

    #[test]
    fn serializes_lowercase_tokens() {
        let snapshot =
            StatusSnapshot::new().with(FeatureKey::new("ui", "Button"), Status::Missing);
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"ui::Button":"missing"}"#
        );
    }
}
