//! Per-voter credit budgets and the single-vote transition.

use crate::cost::calculate_cost;
use crate::error::QuadraticError;
use crate::scoring::calculate_voting_power;
use nestfest_types::{Credits, SubmissionId, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A voter's credit pool for one competition.
///
/// Invariant: `spent_credits <= total_credits`. Budgets that break it are
/// rejected with [`QuadraticError::CorruptBudget`] rather than repaired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub total_credits: Credits,
    pub spent_credits: Credits,
    /// Externally granted credits (referrals, stakes). Counted towards
    /// voting power only, not towards the spendable pool.
    #[serde(default)]
    pub bonus_credits: Credits,
}

/// The cost-accounting part of a vote: what was cast and what it cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteData {
    pub vote_count: i64,
    pub credits_spent: Credits,
}

/// Result of an accepted vote. The caller persists `budget` and `vote`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub voter_id: VoterId,
    pub submission_id: SubmissionId,
    pub budget: Budget,
    pub vote: VoteData,
    pub remaining_credits: Credits,
}

/// Outcome of checking an allocation against a credit limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetValidation {
    pub is_valid: bool,
    pub total_cost: Credits,
    pub available_credits: Credits,
    /// Cost of each allocation entry.
    pub breakdown: BTreeMap<SubmissionId, Credits>,
}

impl Budget {
    pub fn new(total_credits: Credits) -> Self {
        Self {
            total_credits,
            spent_credits: 0,
            bonus_credits: 0,
        }
    }

    pub fn with_spent(self, spent_credits: Credits) -> Self {
        Self {
            spent_credits,
            ..self
        }
    }

    pub fn with_bonus(self, bonus_credits: Credits) -> Self {
        Self {
            bonus_credits,
            ..self
        }
    }

    /// Credits still spendable: `total - spent`.
    pub fn available(&self) -> Result<Credits, QuadraticError> {
        self.total_credits
            .checked_sub(self.spent_credits)
            .ok_or(QuadraticError::CorruptBudget {
                spent: self.spent_credits,
                total: self.total_credits,
            })
    }

    /// Back out a previously recorded vote, producing the baseline a revote
    /// on the same submission must be checked against.
    pub fn refund(&self, previous: &VoteData) -> Result<Budget, QuadraticError> {
        self.available()?;
        let spent_credits = self
            .spent_credits
            .checked_sub(previous.credits_spent)
            .ok_or(QuadraticError::RefundExceedsSpent {
                previous: previous.credits_spent,
                spent: self.spent_credits,
            })?;
        Ok(Self {
            spent_credits,
            ..*self
        })
    }

    /// Voting power from total plus bonus credits, scaled by `multipliers`.
    pub fn voting_power(&self, multipliers: &[f64]) -> Credits {
        calculate_voting_power(self.total_credits, self.bonus_credits, multipliers)
    }
}

impl BudgetValidation {
    /// How far the allocation overshoots the limit (zero when valid).
    pub fn shortfall(&self) -> Credits {
        self.total_cost.saturating_sub(self.available_credits)
    }
}

/// Apply one vote to `budget`, returning the updated budget and vote data.
///
/// All-or-nothing: on any error the caller's budget is unchanged (it is never
/// mutated here at all). For a revote, `budget` must already have the previous
/// cost for this submission backed out (see [`Budget::refund`]).
///
/// The engine holds no lock on the budget. Two concurrent calls against the
/// same stored budget can both succeed from the same baseline, so callers must
/// serialise read-modify-write per (voter, competition), e.g. with a row lock
/// or a version check when persisting the returned budget.
pub fn process_quadratic_vote(
    voter_id: &VoterId,
    submission_id: &SubmissionId,
    vote_count: i64,
    budget: &Budget,
) -> Result<VoteOutcome, QuadraticError> {
    if vote_count < 0 {
        return Err(QuadraticError::NegativeVoteCount(vote_count));
    }
    let available = budget.available()?;
    let cost = calculate_cost(vote_count);
    if cost > available {
        return Err(QuadraticError::InsufficientCredits {
            required: cost,
            available,
        });
    }
    let spent_credits = budget
        .spent_credits
        .checked_add(cost)
        .ok_or(QuadraticError::Overflow)?;
    Ok(VoteOutcome {
        voter_id: voter_id.clone(),
        submission_id: submission_id.clone(),
        budget: Budget {
            spent_credits,
            ..*budget
        },
        vote: VoteData {
            vote_count,
            credits_spent: cost,
        },
        remaining_credits: available - cost,
    })
}

/// Sum the cost of every allocation entry and compare with `available_credits`.
///
/// Spending exactly the limit is valid. A total that does not fit in
/// `Credits` is reported as [`QuadraticError::Overflow`].
pub fn validate_budget(
    allocation: &HashMap<SubmissionId, i64>,
    available_credits: Credits,
) -> Result<BudgetValidation, QuadraticError> {
    let mut breakdown = BTreeMap::new();
    let mut total_cost: Credits = 0;
    for (submission_id, &votes) in allocation {
        let cost = calculate_cost(votes);
        total_cost = total_cost
            .checked_add(cost)
            .ok_or(QuadraticError::Overflow)?;
        breakdown.insert(submission_id.clone(), cost);
    }
    Ok(BudgetValidation {
        is_valid: total_cost <= available_credits,
        total_cost,
        available_credits,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_voter() -> VoterId {
        VoterId::new("voter_1")
    }

    fn test_submission(n: u8) -> SubmissionId {
        SubmissionId::new(format!("sub_{n}"))
    }

    #[test]
    fn test_vote_within_budget_updates_spent() {
        let budget = Budget::new(30);
        let outcome = process_quadratic_vote(&test_voter(), &test_submission(1), 5, &budget).unwrap();
        assert_eq!(outcome.vote.credits_spent, 25);
        assert_eq!(outcome.vote.vote_count, 5);
        assert_eq!(outcome.budget.spent_credits, 25);
        assert_eq!(outcome.remaining_credits, 5);
        // caller's budget untouched
        assert_eq!(budget.spent_credits, 0);
    }

    #[test]
    fn test_vote_over_budget_reports_required_and_available() {
        let budget = Budget::new(30);
        let err = process_quadratic_vote(&test_voter(), &test_submission(1), 6, &budget).unwrap_err();
        match err {
            QuadraticError::InsufficientCredits { required, available } => {
                assert_eq!(required, 36);
                assert_eq!(available, 30);
            }
            _ => panic!("Expected InsufficientCredits error"),
        }
        assert!(!err.is_validation());
    }

    #[test]
    fn test_negative_vote_rejected_regardless_of_budget() {
        for budget in [Budget::new(0), Budget::new(1_000_000), Budget::new(5).with_spent(9)] {
            let err =
                process_quadratic_vote(&test_voter(), &test_submission(1), -1, &budget).unwrap_err();
            assert_eq!(err, QuadraticError::NegativeVoteCount(-1));
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_spending_exact_remainder_is_allowed() {
        let budget = Budget::new(100).with_spent(75);
        let outcome = process_quadratic_vote(&test_voter(), &test_submission(2), 5, &budget).unwrap();
        assert_eq!(outcome.budget.spent_credits, 100);
        assert_eq!(outcome.remaining_credits, 0);
    }

    #[test]
    fn test_zero_vote_costs_nothing() {
        let budget = Budget::new(0);
        let outcome = process_quadratic_vote(&test_voter(), &test_submission(1), 0, &budget).unwrap();
        assert_eq!(outcome.vote.credits_spent, 0);
        assert_eq!(outcome.budget, budget);
    }

    #[test]
    fn test_corrupt_budget_is_rejected() {
        let budget = Budget::new(10).with_spent(11);
        let err = process_quadratic_vote(&test_voter(), &test_submission(1), 0, &budget).unwrap_err();
        assert_eq!(err, QuadraticError::CorruptBudget { spent: 11, total: 10 });
    }

    #[test]
    fn test_refund_backs_out_previous_cost() {
        let budget = Budget::new(30).with_spent(25);
        let previous = VoteData {
            vote_count: 5,
            credits_spent: 25,
        };
        let corrected = budget.refund(&previous).unwrap();
        assert_eq!(corrected.spent_credits, 0);

        let err = Budget::new(30).with_spent(4).refund(&previous).unwrap_err();
        assert_eq!(err, QuadraticError::RefundExceedsSpent { previous: 25, spent: 4 });
    }

    #[test]
    fn test_validate_budget_breakdown_and_equality() {
        let mut allocation = HashMap::new();
        allocation.insert(test_submission(1), 3);
        allocation.insert(test_submission(2), 4);
        let at_limit = validate_budget(&allocation, 25).unwrap();
        assert!(at_limit.is_valid);
        assert_eq!(at_limit.total_cost, 25);
        assert_eq!(at_limit.breakdown[&test_submission(1)], 9);
        assert_eq!(at_limit.breakdown[&test_submission(2)], 16);
        assert_eq!(at_limit.shortfall(), 0);

        let over = validate_budget(&allocation, 24).unwrap();
        assert!(!over.is_valid);
        assert_eq!(over.shortfall(), 1);
    }

    #[test]
    fn test_validate_budget_is_idempotent() {
        let allocation: HashMap<_, _> = (0..10).map(|i| (test_submission(i), i as i64)).collect();
        let first = validate_budget(&allocation, 200).unwrap();
        let second = validate_budget(&allocation, 200).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_budget_overflow_is_an_error() {
        let mut allocation = HashMap::new();
        for i in 0..5 {
            allocation.insert(test_submission(i), i64::MIN);
        }
        assert_eq!(
            validate_budget(&allocation, Credits::MAX).unwrap_err(),
            QuadraticError::Overflow
        );
    }

    #[test]
    fn test_voting_power_includes_bonus() {
        let budget = Budget::new(100).with_bonus(20);
        assert_eq!(budget.voting_power(&[]), 120);
        assert_eq!(budget.voting_power(&[1.5]), 180);
    }
}
