//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the NestFest crates.
#[derive(Debug, Error)]
pub enum NestfestError {
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
}
