//! # Planner Catalog
//!
//! Static description of every engine subsystem feature tracked by the
//! planner, plus the plain-data snapshots (review status, checklist progress)
//! that the planning engine is evaluated against.
//!
//! ## Model
//!
//! ```text
//! Catalog
//!     ├─ Module (id, label, prerequisites, checklist)
//!     │     └─ Feature (category, description, depends_on)
//!     │
//!     └─ FeatureKey  "<module>::<feature>"  (canonical identity)
//!
//! StatusSnapshot      FeatureKey -> Status        (supplied per call)
//! ChecklistProgress   module -> item -> checked   (supplied per call)
//! ```
//!
//! The catalog is immutable once built. Snapshots are never stored inside it,
//! so one catalog can be evaluated against any number of snapshots.
//!
//! ## Example
//!
//! ```rust
//! use planner_catalog::{Catalog, CatalogDef, FeatureDef, ModuleDef};
//!
//! let catalog = Catalog::from_def(CatalogDef::default().with_module(
//!     ModuleDef::new("physics")
//!         .with_feature(FeatureDef::new("Collision").depends_on(["Shapes"]))
//!         .with_feature(FeatureDef::new("Shapes")),
//! ))
//! .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! ```

mod catalog;
mod error;
mod key;
mod progress;
mod status;
mod types;

pub use catalog::{Catalog, CatalogDef, ModuleDef};
pub use error::{CatalogError, Result};
pub use key::{FeatureKey, KEY_SEPARATOR};
pub use progress::ChecklistProgress;
pub use status::{Status, StatusSnapshot};
pub use types::{ChecklistItem, Feature, FeatureDef, Module};
