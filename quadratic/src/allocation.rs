//! Greedy "suggest an allocation" helper.
//!
//! This is a heuristic, not an optimiser: the best allocation of a fixed
//! budget under quadratic cost is an integer program, and nothing here tries
//! to solve it. A knapsack-style or Lagrangian solver would be needed if a
//! provably optimal suggestion is ever required.

use crate::cost::{calculate_max_votes, cost_of_magnitude};
use nestfest_types::{Credits, SubmissionId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Proposed vote counts per submission.
pub type Allocation = HashMap<SubmissionId, i64>;

/// How strongly a voter wants to support a submission (0–10 scale).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub submission_id: SubmissionId,
    pub strength: f64,
}

impl Preference {
    pub fn new(submission_id: impl Into<SubmissionId>, strength: f64) -> Self {
        Self {
            submission_id: submission_id.into(),
            strength,
        }
    }
}

/// Spend `budget` on the strongest preferences first.
///
/// Submissions are visited by descending strength; equal strengths keep their
/// input order. Each gets `min(ceil(strength), floor(sqrt(remaining)))` votes,
/// with strength capped at `max_preference`. Non-positive or non-finite
/// strengths are skipped, as are repeated submissions after the first.
pub fn optimize_allocation(
    preferences: &[Preference],
    budget: Credits,
    max_preference: f64,
) -> Allocation {
    let mut ranked: Vec<&Preference> = preferences
        .iter()
        .filter(|p| p.strength.is_finite() && p.strength > 0.0)
        .collect();
    // stable: ties stay in input order
    ranked.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(Ordering::Equal)
    });

    let mut allocation = Allocation::new();
    let mut remaining = budget;
    for pref in ranked {
        if allocation.contains_key(&pref.submission_id) {
            continue;
        }
        let desired = pref.strength.min(max_preference).ceil() as u64;
        let votes = desired.min(calculate_max_votes(remaining));
        if votes == 0 {
            continue;
        }
        let Ok(count) = i64::try_from(votes) else {
            continue;
        };
        remaining -= cost_of_magnitude(votes);
        allocation.insert(pref.submission_id.clone(), count);
    }
    allocation
}
