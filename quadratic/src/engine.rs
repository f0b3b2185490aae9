//! The quadratic voting engine — one entry point over the pure operations.

use crate::allocation::{optimize_allocation, Allocation, Preference};
use crate::anomaly::{detect_anomalies, AnomalyReport};
use crate::budget::{
    process_quadratic_vote, validate_budget, Budget, BudgetValidation, VoteData, VoteOutcome,
};
use crate::error::QuadraticError;
use crate::insights::{generate_insights, VotingInsights};
use crate::params::EngineParams;
use crate::record::VoteRecord;
use crate::scoring::{calculate_quadratic_scores, WeightedVote};
use nestfest_types::{Credits, SubmissionId, VoterId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Stateless apart from its parameters, so one instance can be shared
/// across request handlers.
#[derive(Clone, Debug, Default)]
pub struct QuadraticEngine {
    params: EngineParams,
}

impl QuadraticEngine {
    /// Create an engine, rejecting invalid parameters.
    pub fn new(params: EngineParams) -> Result<Self, QuadraticError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Apply a first vote on a submission. See [`process_quadratic_vote`]
    /// for the caller's locking obligation.
    pub fn process_vote(
        &self,
        voter_id: &VoterId,
        submission_id: &SubmissionId,
        vote_count: i64,
        budget: &Budget,
    ) -> Result<VoteOutcome, QuadraticError> {
        let result = process_quadratic_vote(voter_id, submission_id, vote_count, budget);
        match &result {
            Ok(outcome) => debug!(
                voter = %voter_id,
                submission = %submission_id,
                vote_count,
                cost = %outcome.vote.credits_spent,
                remaining = %outcome.remaining_credits,
                "vote accepted"
            ),
            Err(e) => debug!(
                voter = %voter_id,
                submission = %submission_id,
                vote_count,
                "vote rejected: {e}"
            ),
        }
        result
    }

    /// Replace `previous` (the voter's stored vote on this submission) with
    /// `vote_count`, checking the new cost against the budget with the old
    /// cost backed out.
    pub fn process_revote(
        &self,
        voter_id: &VoterId,
        submission_id: &SubmissionId,
        previous: &VoteData,
        vote_count: i64,
        budget: &Budget,
    ) -> Result<VoteOutcome, QuadraticError> {
        if vote_count < 0 {
            return Err(QuadraticError::NegativeVoteCount(vote_count));
        }
        let baseline = budget.refund(previous)?;
        self.process_vote(voter_id, submission_id, vote_count, &baseline)
    }

    pub fn validate_budget(
        &self,
        allocation: &HashMap<SubmissionId, i64>,
        available_credits: Credits,
    ) -> Result<BudgetValidation, QuadraticError> {
        validate_budget(allocation, available_credits)
    }

    /// Greedy allocation suggestion (not optimal; see [`crate::allocation`]).
    pub fn optimize_allocation(&self, preferences: &[Preference], budget: Credits) -> Allocation {
        optimize_allocation(preferences, budget, self.params.max_preference)
    }

    pub fn quadratic_scores(&self, votes: &[WeightedVote]) -> BTreeMap<SubmissionId, f64> {
        calculate_quadratic_scores(votes)
    }

    pub fn detect_anomalies(&self, votes: &[VoteRecord]) -> AnomalyReport {
        let report = detect_anomalies(votes, &self.params.anomaly);
        debug!(
            votes = votes.len(),
            patterns = report.suspicious_patterns.len(),
            flagged = report.flagged_voters.len(),
            confidence = report.confidence_score,
            "anomaly scan complete"
        );
        report
    }

    pub fn generate_insights(&self, votes: &[VoteRecord]) -> VotingInsights {
        generate_insights(votes, self.params.top_target_count)
    }
}
