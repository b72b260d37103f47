use planner_catalog::CatalogError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown effort level: {0} (expected trivial|small|medium|large)")]
    UnknownEffortLevel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
