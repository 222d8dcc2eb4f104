//! Source adapters
//!
//! Independent clients for each raw nutrition data source. The two
//! external adapters fail closed to "no data"; the model fallback is
//! the backstop and surfaces its failures.

mod model_fallback;
mod natural_language;
mod product_db;

pub use model_fallback::{FallbackEstimate, ModelFallback};
pub use natural_language::NaturalLanguageClient;
pub use product_db::ProductDatabaseClient;
