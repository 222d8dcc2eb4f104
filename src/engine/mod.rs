//! Estimate reconciliation engine
//!
//! Sanitizer, quantity extraction, category clamp, override rules, and
//! the reconciler that orchestrates them over the source adapters.

pub mod categories;
pub mod overrides;
pub mod quantity;
pub mod reconciler;
pub mod sanitize;

use thiserror::Error;

/// Errors a reconciliation request can surface to the caller.
///
/// Source adapters never produce these; they fail closed to "no data".
/// Only the model fallback is fatal, because by then every source has
/// already come up empty.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no fallback credential configured and no external source returned data")]
    FallbackUnavailable,

    #[error("fallback model request failed: {0}")]
    Fallback(String),

    #[error("fallback model returned unusable content: {0}")]
    FallbackParse(String),
}

pub use reconciler::Reconciler;
