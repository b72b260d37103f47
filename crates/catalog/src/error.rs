use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while building a catalog or loading snapshot data
#[derive(Error, Debug)]
pub enum CatalogError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON document could not be parsed
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Fully-qualified key is malformed
    #[error("Invalid feature key '{0}': expected '<module>::<feature>'")]
    InvalidKey(String),

    /// Status token is not one of the five known statuses
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),

    /// Module or feature identifier is empty or contains the key separator
    #[error("Invalid identifier '{value}' for {kind}")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Module declared twice
    #[error("Duplicate module '{0}'")]
    DuplicateModule(String),

    /// Unsupported catalog file format
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}

impl CatalogError {
    pub(crate) fn invalid_identifier(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }
}
