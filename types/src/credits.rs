//! Voice credit amounts.
//!
//! Credits are whole units stored as `u128`. The square of any `i64` vote
//! count fits in a `u128`, so the quadratic cost of a single vote can never
//! overflow; only sums need checked arithmetic.

/// A quantity of voice credits.
pub type Credits = u128;
