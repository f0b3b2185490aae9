//! Caller-facing shape of a single vote attempt.

use nestfest_quadratic::{QuadraticError, VoteOutcome};
use nestfest_types::Credits;
use serde::Serialize;

/// Either the accepted outcome, or the reason with the figures a UI needs
/// to explain an insufficient-credit rejection.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoteResponse {
    Accepted(VoteOutcome),
    Rejected {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        required_credits: Option<Credits>,
        #[serde(skip_serializing_if = "Option::is_none")]
        available_credits: Option<Credits>,
    },
}

impl VoteResponse {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

impl From<Result<VoteOutcome, QuadraticError>> for VoteResponse {
    fn from(result: Result<VoteOutcome, QuadraticError>) -> Self {
        match result {
            Ok(outcome) => Self::Accepted(outcome),
            Err(e) => {
                let (required_credits, available_credits) = match e {
                    QuadraticError::InsufficientCredits {
                        required,
                        available,
                    } => (Some(required), Some(available)),
                    _ => (None, None),
                };
                Self::Rejected {
                    reason: e.to_string(),
                    required_credits,
                    available_credits,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestfest_quadratic::{process_quadratic_vote, Budget};
    use nestfest_types::{SubmissionId, VoterId};

    fn attempt(count: i64) -> VoteResponse {
        process_quadratic_vote(
            &VoterId::new("v1"),
            &SubmissionId::new("s1"),
            count,
            &Budget::new(30),
        )
        .into()
    }

    #[test]
    fn accepted_vote_serializes_outcome() {
        let response = attempt(5);
        assert!(response.is_accepted());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["remaining_credits"], 5);
    }

    #[test]
    fn insufficient_credits_carry_figures() {
        let json = serde_json::to_value(attempt(6)).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["required_credits"], 36);
        assert_eq!(json["available_credits"], 30);
    }

    #[test]
    fn validation_failures_omit_figures() {
        let json = serde_json::to_value(attempt(-1)).unwrap();
        assert_eq!(json["status"], "rejected");
        assert!(json.get("required_credits").is_none());
    }
}
