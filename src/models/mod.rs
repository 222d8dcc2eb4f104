//! Data models
//!
//! Rust structs flowing through one reconciliation request.

mod estimate;
mod macros;
mod query;
mod source_result;

pub use estimate::{ReconciledEstimate, KCAL_CEILING};
pub use macros::Macros;
pub use query::FoodQuery;
pub use source_result::{Basis, Source, SourceResult};
