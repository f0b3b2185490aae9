//! Score aggregation and voting power.
//!
//! Weights scale a vote's contribution to a submission's score (judges vs.
//! public voters, say). They never change what the vote cost.

use crate::record::VoteRecord;
use nestfest_types::{Credits, SubmissionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A vote as seen by the scorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedVote {
    pub submission_id: SubmissionId,
    pub vote_count: i64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl WeightedVote {
    pub fn new(submission_id: impl Into<SubmissionId>, vote_count: i64, weight: f64) -> Self {
        Self {
            submission_id: submission_id.into(),
            vote_count,
            weight,
        }
    }
}

impl From<&VoteRecord> for WeightedVote {
    fn from(record: &VoteRecord) -> Self {
        Self {
            submission_id: record.submission_id.clone(),
            vote_count: record.vote_count,
            weight: default_weight(),
        }
    }
}

/// Sum `vote_count * weight` per submission.
pub fn calculate_quadratic_scores(votes: &[WeightedVote]) -> BTreeMap<SubmissionId, f64> {
    let mut scores = BTreeMap::new();
    for vote in votes {
        *scores.entry(vote.submission_id.clone()).or_insert(0.0) +=
            vote.vote_count as f64 * vote.weight;
    }
    scores
}

/// `floor((base + bonus) * Π multipliers)`.
///
/// An empty multiplier list is the identity. Negative or NaN results give
/// zero power; results beyond `Credits::MAX` saturate.
pub fn calculate_voting_power(
    base_credits: Credits,
    bonus_credits: Credits,
    multipliers: &[f64],
) -> Credits {
    let product: f64 = multipliers.iter().product();
    let power = base_credits.saturating_add(bonus_credits) as f64 * product;
    if power > 0.0 {
        power.floor() as Credits
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_accumulate_weighted_counts() {
        let votes = vec![WeightedVote::new("A", 3, 2.0), WeightedVote::new("A", 1, 1.0)];
        let scores = calculate_quadratic_scores(&votes);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&SubmissionId::new("A")], 7.0);
    }

    #[test]
    fn test_scores_keep_targets_separate() {
        let votes = vec![
            WeightedVote::new("A", 2, 1.0),
            WeightedVote::new("B", 4, 0.5),
            WeightedVote::new("A", -1, 1.0),
        ];
        let scores = calculate_quadratic_scores(&votes);
        assert_eq!(scores[&SubmissionId::new("A")], 1.0);
        assert_eq!(scores[&SubmissionId::new("B")], 2.0);
        assert!(calculate_quadratic_scores(&[]).is_empty());
    }

    #[test]
    fn test_missing_weight_defaults_to_one() {
        let vote: WeightedVote =
            serde_json::from_str(r#"{"submission_id":"A","vote_count":3}"#).unwrap();
        assert_eq!(vote.weight, 1.0);
    }

    #[test]
    fn test_voting_power() {
        assert_eq!(calculate_voting_power(100, 0, &[]), 100);
        assert_eq!(calculate_voting_power(100, 50, &[]), 150);
        assert_eq!(calculate_voting_power(100, 0, &[1.5, 2.0]), 300);
        assert_eq!(calculate_voting_power(10, 0, &[0.33]), 3);
        assert_eq!(calculate_voting_power(10, 0, &[-1.0]), 0);
        assert_eq!(calculate_voting_power(10, 0, &[f64::NAN]), 0);
    }
}
