//! Rule-based anomaly detection over a batch of vote records.
//!
//! Four independent signals, each producing a [`SuspiciousPattern`] and
//! flagging the voters involved:
//! 1. rapid voting (many votes from one voter in a short window)
//! 2. cost mismatch (`credits_spent` disagrees with `|vote_count|²`)
//! 3. extreme concentration (one vote dominates a voter's total)
//! 4. shared-IP fan-out (too many distinct voters on one address)
//!
//! Findings are advisory. Nothing here blocks, nullifies or corrects votes;
//! reports are meant for human review.

use crate::cost::calculate_cost;
use crate::params::AnomalyThresholds;
use crate::record::VoteRecord;
use nestfest_types::{Credits, SubmissionId, VoterId};
use nestfest_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;
use tracing::{info_span, warn};

/// A single heuristic finding.
///
/// Externally tagged: serde cannot buffer the `u128` credit fields that an
/// internally tagged enum would need to read back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousPattern {
    RapidVoting {
        voter_id: VoterId,
        vote_count: usize,
        span_secs: u64,
    },
    CostMismatch {
        voter_id: VoterId,
        submission_id: SubmissionId,
        vote_count: i64,
        expected_credits: Credits,
        recorded_credits: Credits,
    },
    ExtremeConcentration {
        voter_id: VoterId,
        max_vote_count: u64,
        total_vote_count: u128,
    },
    SharedIp {
        ip_address: IpAddr,
        voter_ids: Vec<VoterId>,
    },
}

/// Output of [`detect_anomalies`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub suspicious_patterns: Vec<SuspiciousPattern>,
    pub flagged_voters: BTreeSet<VoterId>,
    /// Distinct voters in the scanned batch.
    pub total_voters: usize,
    /// Coarse severity in `[0, 1]` for ranking reports. Not a probability.
    pub confidence_score: f64,
}

impl SuspiciousPattern {
    /// Voters implicated by this finding.
    pub fn voters(&self) -> Vec<&VoterId> {
        match self {
            Self::RapidVoting { voter_id, .. }
            | Self::CostMismatch { voter_id, .. }
            | Self::ExtremeConcentration { voter_id, .. } => vec![voter_id],
            Self::SharedIp { voter_ids, .. } => voter_ids.iter().collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RapidVoting { .. } => "rapid_voting",
            Self::CostMismatch { .. } => "cost_mismatch",
            Self::ExtremeConcentration { .. } => "extreme_concentration",
            Self::SharedIp { .. } => "shared_ip",
        }
    }
}

impl fmt::Display for SuspiciousPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RapidVoting {
                voter_id,
                vote_count,
                span_secs,
            } => write!(
                f,
                "rapid voting: voter {voter_id} cast {vote_count} votes within {}",
                format_duration(*span_secs)
            ),
            Self::CostMismatch {
                voter_id,
                submission_id,
                vote_count,
                expected_credits,
                recorded_credits,
            } => write!(
                f,
                "cost mismatch: voter {voter_id} recorded {recorded_credits} credits for \
                 {vote_count} votes on {submission_id}, expected {expected_credits}"
            ),
            Self::ExtremeConcentration {
                voter_id,
                max_vote_count,
                total_vote_count,
            } => write!(
                f,
                "extreme concentration: voter {voter_id} placed {max_vote_count} of \
                 {total_vote_count} votes on a single submission"
            ),
            Self::SharedIp {
                ip_address,
                voter_ids,
            } => write!(
                f,
                "shared IP: {} distinct voters voted from {ip_address}",
                voter_ids.len()
            ),
        }
    }
}

impl AnomalyReport {
    pub fn is_clean(&self) -> bool {
        self.suspicious_patterns.is_empty()
    }

    /// Human-readable description of every finding, in detection order.
    pub fn descriptions(&self) -> Vec<String> {
        self.suspicious_patterns.iter().map(ToString::to_string).collect()
    }

    fn record(&mut self, pattern: SuspiciousPattern) {
        warn!(kind = pattern.kind(), "{pattern}");
        self.flagged_voters
            .extend(pattern.voters().into_iter().cloned());
        self.suspicious_patterns.push(pattern);
    }
}

/// Scan `votes` for the four anomaly signals.
///
/// `confidence_score = min(1, flagged / total_voters * patterns * scale)`,
/// and zero for an empty batch.
pub fn detect_anomalies(votes: &[VoteRecord], thresholds: &AnomalyThresholds) -> AnomalyReport {
    let _span = info_span!("anomaly_scan", votes = votes.len()).entered();

    let mut by_voter: BTreeMap<&VoterId, Vec<&VoteRecord>> = BTreeMap::new();
    for vote in votes {
        by_voter.entry(&vote.voter_id).or_default().push(vote);
    }

    let mut report = AnomalyReport {
        total_voters: by_voter.len(),
        ..AnomalyReport::default()
    };

    for (voter_id, voter_votes) in &by_voter {
        if let Some(pattern) = check_rapid_voting(voter_id, voter_votes, thresholds) {
            report.record(pattern);
        }
    }

    for vote in votes {
        if let Some(pattern) = check_cost_mismatch(vote, thresholds) {
            report.record(pattern);
        }
    }

    for (voter_id, voter_votes) in &by_voter {
        if let Some(pattern) = check_concentration(voter_id, voter_votes, thresholds) {
            report.record(pattern);
        }
    }

    for pattern in check_shared_ips(votes, thresholds) {
        report.record(pattern);
    }

    report.confidence_score = confidence_score(
        report.flagged_voters.len(),
        report.total_voters,
        report.suspicious_patterns.len(),
        thresholds.confidence_scale,
    );
    report
}

fn check_rapid_voting(
    voter_id: &VoterId,
    votes: &[&VoteRecord],
    thresholds: &AnomalyThresholds,
) -> Option<SuspiciousPattern> {
    if votes.len() <= thresholds.rapid_min_votes {
        return None;
    }
    let earliest = votes.iter().map(|v| v.timestamp).min()?;
    let latest = votes.iter().map(|v| v.timestamp).max()?;
    let span_secs = earliest.elapsed_since(latest);
    (span_secs < thresholds.rapid_window_secs).then(|| SuspiciousPattern::RapidVoting {
        voter_id: voter_id.clone(),
        vote_count: votes.len(),
        span_secs,
    })
}

fn check_cost_mismatch(
    vote: &VoteRecord,
    thresholds: &AnomalyThresholds,
) -> Option<SuspiciousPattern> {
    let expected = calculate_cost(vote.vote_count);
    let deviation = vote.credits_spent.abs_diff(expected) as f64;
    (deviation > thresholds.cost_tolerance).then(|| SuspiciousPattern::CostMismatch {
        voter_id: vote.voter_id.clone(),
        submission_id: vote.submission_id.clone(),
        vote_count: vote.vote_count,
        expected_credits: expected,
        recorded_credits: vote.credits_spent,
    })
}

fn check_concentration(
    voter_id: &VoterId,
    votes: &[&VoteRecord],
    thresholds: &AnomalyThresholds,
) -> Option<SuspiciousPattern> {
    if votes.len() < thresholds.concentration_min_votes {
        return None;
    }
    let max = votes.iter().map(|v| v.vote_count.unsigned_abs()).max()?;
    let total: u128 = votes.iter().map(|v| v.vote_count.unsigned_abs() as u128).sum();
    if total == 0 {
        return None;
    }
    // max / total > bps / 10_000, kept in integers
    let dominant = (max as u128) * 10_000 > total * thresholds.concentration_bps as u128;
    dominant.then(|| SuspiciousPattern::ExtremeConcentration {
        voter_id: voter_id.clone(),
        max_vote_count: max,
        total_vote_count: total,
    })
}

fn check_shared_ips(
    votes: &[VoteRecord],
    thresholds: &AnomalyThresholds,
) -> Vec<SuspiciousPattern> {
    let mut by_ip: BTreeMap<IpAddr, BTreeSet<&VoterId>> = BTreeMap::new();
    for vote in votes {
        if let Some(ip) = vote.ip_address {
            by_ip.entry(ip).or_default().insert(&vote.voter_id);
        }
    }
    by_ip
        .into_iter()
        .filter(|(_, voters)| voters.len() > thresholds.max_voters_per_ip)
        .map(|(ip_address, voters)| SuspiciousPattern::SharedIp {
            ip_address,
            voter_ids: voters.into_iter().cloned().collect(),
        })
        .collect()
}

fn confidence_score(flagged: usize, total_voters: usize, patterns: usize, scale: f64) -> f64 {
    if total_voters == 0 {
        return 0.0;
    }
    let share = flagged as f64 / total_voters as f64;
    (share * patterns as f64 * scale).clamp(0.0, 1.0)
}
