//! Error types for the BluBlock engine.

use crate::store::StoreError;

/// Errors surfaced to callers of the engine's mutators.
///
/// Classification never fails: a missing or unusable URL is an "allow",
/// not an error, and persistence faults are logged rather than returned
/// from the request path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
