//! Quadratic voting engine for NestFest competitions.
//!
//! Casting `n` votes on one submission costs `n²` voice credits, so marginal
//! votes on the same target get progressively more expensive. This crate handles:
//! - Cost and budget arithmetic (cost, max affordable votes, allocation validation)
//! - Applying a single vote against a voter's budget (pure, all-or-nothing)
//! - A greedy "suggest an allocation" helper
//! - Weighted score aggregation and voting power
//! - Rule-based anomaly detection and insight summaries over a vote batch
//!
//! Every operation is a pure function of its inputs. The engine owns no storage,
//! so serialising concurrent updates to the same budget is the caller's job.

pub mod allocation;
pub mod anomaly;
pub mod budget;
pub mod cost;
pub mod engine;
pub mod error;
pub mod insights;
pub mod params;
pub mod record;
pub mod scoring;

pub use allocation::{optimize_allocation, Allocation, Preference};
pub use anomaly::{detect_anomalies, AnomalyReport, SuspiciousPattern};
pub use budget::{
    process_quadratic_vote, validate_budget, Budget, BudgetValidation, VoteData, VoteOutcome,
};
pub use cost::{calculate_cost, calculate_max_votes, cost_of_magnitude, integer_sqrt};
pub use engine::QuadraticEngine;
pub use error::QuadraticError;
pub use insights::{generate_insights, EngagementMetrics, TargetSummary, VotingInsights};
pub use params::{AnomalyThresholds, EngineParams};
pub use record::VoteRecord;
pub use scoring::{calculate_quadratic_scores, calculate_voting_power, WeightedVote};
