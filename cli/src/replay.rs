//! Replays a log of vote requests through the engine the way an API layer
//! would: one budget per voter held in memory, the previous vote on a
//! submission backed out before a revote, and the returned budget persisted
//! only when the vote is accepted.
//!
//! Requests are applied strictly in order, which is the serialisation the
//! engine requires of its callers.

use nestfest_quadratic::{Budget, QuadraticEngine, QuadraticError, VoteData, VoteRecord};
use nestfest_types::{CompetitionId, Credits, SubmissionId, Timestamp, VoterId};
use nestfest_utils::StatsCounter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use tracing::{info, info_span};

const ACCEPTED: &str = "accepted";
const REVOTES: &str = "revotes";
const INSUFFICIENT_CREDITS: &str = "insufficient_credits";
const INVALID: &str = "invalid";
const UNKNOWN_VOTER: &str = "unknown_voter";

#[derive(Clone, Debug, Deserialize)]
pub struct ReplayFile {
    #[serde(default)]
    pub competition_id: Option<CompetitionId>,
    pub budgets: Vec<BudgetGrant>,
    pub requests: Vec<VoteRequest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BudgetGrant {
    pub voter_id: VoterId,
    pub total_credits: Credits,
    #[serde(default)]
    pub bonus_credits: Credits,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoteRequest {
    pub voter_id: VoterId,
    pub submission_id: SubmissionId,
    pub vote_count: i64,
    #[serde(default = "default_timestamp")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
}

fn default_timestamp() -> Timestamp {
    Timestamp::EPOCH
}

#[derive(Clone, Debug, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub voter_id: VoterId,
    pub submission_id: SubmissionId,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub budgets: BTreeMap<VoterId, Budget>,
    /// Final stored votes, ready to feed to `audit` or `insights`.
    pub votes: Vec<VoteRecord>,
    pub rejections: Vec<Rejection>,
    pub stats: BTreeMap<&'static str, u64>,
}

struct StoredVote {
    data: VoteData,
    timestamp: Timestamp,
    ip_address: Option<IpAddr>,
}

pub fn replay(engine: &QuadraticEngine, file: &ReplayFile) -> ReplayReport {
    let _span = info_span!("replay", requests = file.requests.len()).entered();
    let stats = StatsCounter::new(&[
        ACCEPTED,
        REVOTES,
        INSUFFICIENT_CREDITS,
        INVALID,
        UNKNOWN_VOTER,
    ]);

    let mut budgets: BTreeMap<VoterId, Budget> = BTreeMap::new();
    for grant in &file.budgets {
        let budget = Budget::new(grant.total_credits).with_bonus(grant.bonus_credits);
        budgets.insert(grant.voter_id.clone(), budget);
    }

    let mut stored: HashMap<(VoterId, SubmissionId), StoredVote> = HashMap::new();
    let mut order: Vec<(VoterId, SubmissionId)> = Vec::new();
    let mut rejections = Vec::new();

    for (index, request) in file.requests.iter().enumerate() {
        let reject = |reason: String| Rejection {
            index,
            voter_id: request.voter_id.clone(),
            submission_id: request.submission_id.clone(),
            reason,
        };

        let Some(budget) = budgets.get_mut(&request.voter_id) else {
            stats.increment(UNKNOWN_VOTER);
            rejections.push(reject(format!("no budget for voter {}", request.voter_id)));
            continue;
        };

        let key = (request.voter_id.clone(), request.submission_id.clone());
        let previous = stored.get(&key).map(|v| v.data);
        let result = match &previous {
            Some(prev) => engine.process_revote(
                &request.voter_id,
                &request.submission_id,
                prev,
                request.vote_count,
                budget,
            ),
            None => engine.process_vote(
                &request.voter_id,
                &request.submission_id,
                request.vote_count,
                budget,
            ),
        };

        match result {
            Ok(outcome) => {
                stats.increment(ACCEPTED);
                if previous.is_some() {
                    stats.increment(REVOTES);
                } else {
                    order.push(key.clone());
                }
                *budget = outcome.budget;
                stored.insert(
                    key,
                    StoredVote {
                        data: outcome.vote,
                        timestamp: request.timestamp,
                        ip_address: request.ip_address,
                    },
                );
            }
            Err(e @ QuadraticError::InsufficientCredits { .. }) => {
                stats.increment(INSUFFICIENT_CREDITS);
                rejections.push(reject(e.to_string()));
            }
            Err(e) => {
                stats.increment(INVALID);
                rejections.push(reject(e.to_string()));
            }
        }
    }

    let votes = order
        .into_iter()
        .filter_map(|key| {
            let vote = stored.remove(&key)?;
            Some(VoteRecord {
                competition_id: file.competition_id.clone(),
                submission_id: key.1,
                voter_id: key.0,
                vote_count: vote.data.vote_count,
                credits_spent: vote.data.credits_spent,
                timestamp: vote.timestamp,
                ip_address: vote.ip_address,
            })
        })
        .collect();

    let stats = stats.snapshot();
    info!(
        accepted = stats[ACCEPTED],
        rejected = rejections.len(),
        "replay finished"
    );

    ReplayReport {
        budgets,
        votes,
        rejections,
        stats,
    }
}
