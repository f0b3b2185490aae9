//! Summary statistics over a vote batch for admin dashboards.

use crate::record::VoteRecord;
use nestfest_types::{Credits, SubmissionId, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug_span;

/// Aggregate standing of one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub submission_id: SubmissionId,
    pub total_votes: i128,
    pub total_credits: Credits,
    pub voter_count: usize,
}

/// Engagement figures. `participation_rate` needs the number of eligible
/// voters, which the engine does not know; it stays `None` until the caller
/// supplies it through [`VotingInsights::with_eligible_voters`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub unique_voters: usize,
    pub votes_per_voter: f64,
    /// UTC hour with the most votes (earliest hour on ties).
    pub peak_hour: Option<u8>,
    pub participation_rate: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VotingInsights {
    pub total_votes: usize,
    pub total_credits_spent: Credits,
    /// Mean `|vote_count|` per record.
    pub average_intensity: f64,
    pub top_targets: Vec<TargetSummary>,
    /// Vote records per UTC hour of day.
    pub hourly_distribution: [u64; 24],
    pub engagement: EngagementMetrics,
}

impl VotingInsights {
    /// Fill in `participation_rate` as `unique_voters / eligible_voters`.
    pub fn with_eligible_voters(mut self, eligible_voters: u64) -> Self {
        self.engagement.participation_rate = (eligible_voters > 0)
            .then(|| self.engagement.unique_voters as f64 / eligible_voters as f64);
        self
    }
}

/// Summarise `votes`, listing at most `top_target_count` submissions.
///
/// Top targets are ordered by summed vote count, highest first, with ties
/// broken by submission id.
pub fn generate_insights(votes: &[VoteRecord], top_target_count: usize) -> VotingInsights {
    let _span = debug_span!("generate_insights", votes = votes.len()).entered();

    let mut hourly_distribution = [0u64; 24];
    let mut total_credits_spent: Credits = 0;
    let mut total_intensity: u128 = 0;
    let mut voters: BTreeSet<&VoterId> = BTreeSet::new();
    let mut targets: BTreeMap<&SubmissionId, (i128, Credits, BTreeSet<&VoterId>)> =
        BTreeMap::new();

    for vote in votes {
        hourly_distribution[vote.timestamp.hour_of_day() as usize] += 1;
        total_credits_spent = total_credits_spent.saturating_add(vote.credits_spent);
        total_intensity += vote.vote_count.unsigned_abs() as u128;
        voters.insert(&vote.voter_id);

        let entry = targets.entry(&vote.submission_id).or_default();
        entry.0 += vote.vote_count as i128;
        entry.1 = entry.1.saturating_add(vote.credits_spent);
        entry.2.insert(&vote.voter_id);
    }

    let mut top_targets: Vec<TargetSummary> = targets
        .into_iter()
        .map(|(submission_id, (total_votes, total_credits, voters))| TargetSummary {
            submission_id: submission_id.clone(),
            total_votes,
            total_credits,
            voter_count: voters.len(),
        })
        .collect();
    // BTreeMap order already sorts by id; the stable sort keeps it for ties
    top_targets.sort_by(|a, b| b.total_votes.cmp(&a.total_votes));
    top_targets.truncate(top_target_count);

    let (average_intensity, votes_per_voter) = if votes.is_empty() {
        (0.0, 0.0)
    } else {
        (
            total_intensity as f64 / votes.len() as f64,
            votes.len() as f64 / voters.len() as f64,
        )
    };

    let peak_hour = hourly_distribution
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .max_by(|(ha, ca), (hb, cb)| ca.cmp(cb).then(hb.cmp(ha)))
        .map(|(hour, _)| hour as u8);

    VotingInsights {
        total_votes: votes.len(),
        total_credits_spent,
        average_intensity,
        top_targets,
        hourly_distribution,
        engagement: EngagementMetrics {
            unique_voters: voters.len(),
            votes_per_voter,
            peak_hour,
            participation_rate: None,
        },
    }
}
