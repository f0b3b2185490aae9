//! Stored vote records as supplied by the caller for batch analysis.

use nestfest_types::{CompetitionId, Credits, SubmissionId, Timestamp, VoterId};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One persisted quadratic vote, keyed by (competition, submission, voter).
///
/// `credits_spent` should always equal `calculate_cost(vote_count)`; records
/// that disagree are reported by the anomaly detector, never corrected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_id: Option<CompetitionId>,
    pub submission_id: SubmissionId,
    pub voter_id: VoterId,
    pub vote_count: i64,
    pub credits_spent: Credits,
    pub timestamp: Timestamp,
    /// Source address of the request, when the caller recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddr>,
}
