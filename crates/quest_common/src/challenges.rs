//! Time-boxed challenges with per-user progress.
//!
//! `completed` is sticky: once progress reaches the target it never reverts,
//! and the challenge reward is granted exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A challenge definition: reach `target_value` within the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_value: i64,
    pub points: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Challenge {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

/// Per-user progress against one challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserChallenge {
    pub user_id: Uuid,
    pub challenge_id: String,
    pub progress: i64,
    pub completed: bool,
}

/// Result of recording progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeUpdate {
    pub progress: i64,
    pub completed: bool,
    /// True only on the transition to completed; the reward is granted then.
    pub newly_completed: bool,
}

/// Add `amount` to the user's progress counter.
///
/// Progress only accrues while the challenge is active; a completed
/// challenge never accrues or completes again.
pub fn record_progress(
    challenge: &Challenge,
    current: &UserChallenge,
    amount: i64,
    now: DateTime<Utc>,
) -> ChallengeUpdate {
    if current.completed || !challenge.is_active(now) {
        return ChallengeUpdate {
            progress: current.progress,
            completed: current.completed,
            newly_completed: false,
        };
    }

    let progress = current.progress + amount;
    let completed = progress >= challenge.target_value;
    ChallengeUpdate {
        progress,
        completed,
        newly_completed: completed,
    }
}
