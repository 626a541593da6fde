//! Error types for the Soaris state stores.
//!
//! Store mutations never fail: out-of-range input is corrected or ignored
//! and persistence is best-effort. Errors only surface where the caller has
//! to react, such as finishing an incomplete area drawing.

use thiserror::Error;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors surfaced by the state crate.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("area selection needs exactly {expected} points, got {actual}")]
    IncompleteArea { expected: usize, actual: usize },

    #[error("unknown {kind}: {value:?}")]
    Unknown { kind: &'static str, value: String },

    #[error("serialization error: {0}")]
    Serialize(String),
}
