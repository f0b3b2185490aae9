//! Quadratic-voting errors.

use nestfest_types::Credits;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadraticError {
    #[error("vote count must be non-negative, got {0}")]
    NegativeVoteCount(i64),

    #[error("insufficient credits: need {required}, available {available}")]
    InsufficientCredits { required: Credits, available: Credits },

    #[error("budget is inconsistent: spent {spent} exceeds total {total}")]
    CorruptBudget { spent: Credits, total: Credits },

    #[error("previous vote cost {previous} exceeds spent credits {spent}")]
    RefundExceedsSpent { previous: Credits, spent: Credits },

    #[error("invalid engine parameters: {0}")]
    InvalidParams(String),

    #[error("arithmetic overflow in credit computation")]
    Overflow,
}

impl QuadraticError {
    /// Whether the request was rejected before any budget arithmetic, as
    /// opposed to an ordinary shortage of credits.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::InsufficientCredits { .. })
    }
}
