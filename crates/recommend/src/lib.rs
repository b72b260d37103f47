//! Next-best-action recommendations for module checklists.
//!
//! Each unchecked checklist item is scored from five weighted components:
//!
//! | Component | Signal |
//! |-----------|--------|
//! | `urgency` | position in the checklist (earlier steps are foundational) |
//! | `successProb` | effort level of the features the step delivers |
//! | `impact` | unlock cascade of those features under the status snapshot |
//! | `recency` | closeness to the most recently completed step |
//! | `readiness` | prerequisite module completion and feature blockers |
//!
//! The component values sum to the item's score before rounding.

mod config;
mod nba;

pub use config::{ConfigError, NbaWeights};
pub use nba::{compute_nba, top_recommendation, Breakdown, NbaScorer, Recommendation};
