//! Fundamental types for the NestFest voting engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! voter / submission / competition identifiers, credit amounts, and timestamps.

pub mod credits;
pub mod error;
pub mod ids;
pub mod time;

pub use credits::Credits;
pub use error::NestfestError;
pub use ids::{CompetitionId, SubmissionId, VoterId};
pub use time::Timestamp;
