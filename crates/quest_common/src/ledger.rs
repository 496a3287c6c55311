//! Point-delta ledger.
//!
//! Every profile point mutation is expressed as a `PointDelta` and applied by
//! a single serialized updater per user, rather than scattered
//! read-modify-write sequences. questd records each applied delta in an
//! append-only table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why points changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointDeltaKind {
    TaskCompletion,
    ComboBonus,
    DailyReward,
    BadgeReward,
    ChallengeReward,
    OverduePenalty,
}

impl std::fmt::Display for PointDeltaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TaskCompletion => "task_completion",
            Self::ComboBonus => "combo_bonus",
            Self::DailyReward => "daily_reward",
            Self::BadgeReward => "badge_reward",
            Self::ChallengeReward => "challenge_reward",
            Self::OverduePenalty => "overdue_penalty",
        };
        write!(f, "{}", name)
    }
}

impl PointDeltaKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task_completion" => Some(Self::TaskCompletion),
            "combo_bonus" => Some(Self::ComboBonus),
            "daily_reward" => Some(Self::DailyReward),
            "badge_reward" => Some(Self::BadgeReward),
            "challenge_reward" => Some(Self::ChallengeReward),
            "overdue_penalty" => Some(Self::OverduePenalty),
            _ => None,
        }
    }
}

/// One point mutation for one user. Penalties carry a negative amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointDelta {
    pub user_id: Uuid,
    pub kind: PointDeltaKind,
    pub amount: i64,
    /// What earned it: a task id, badge id, challenge id.
    pub reference: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PointDelta {
    pub fn new(user_id: Uuid, kind: PointDeltaKind, amount: i64) -> Self {
        Self {
            user_id,
            kind,
            amount,
            reference: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Total points after applying one delta, clamped at zero.
pub fn apply(total_points: i64, delta: &PointDelta) -> i64 {
    (total_points + delta.amount).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_and_penalty() {
        let user = Uuid::new_v4();
        let award = PointDelta::new(user, PointDeltaKind::TaskCompletion, 30);
        assert_eq!(apply(100, &award), 130);

        let penalty = PointDelta::new(user, PointDeltaKind::OverduePenalty, -10);
        assert_eq!(apply(130, &penalty), 120);
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let penalty = PointDelta::new(Uuid::new_v4(), PointDeltaKind::OverduePenalty, -50);
        assert_eq!(apply(3, &penalty), 0);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            PointDeltaKind::TaskCompletion,
            PointDeltaKind::ComboBonus,
            PointDeltaKind::DailyReward,
            PointDeltaKind::BadgeReward,
            PointDeltaKind::ChallengeReward,
            PointDeltaKind::OverduePenalty,
        ] {
            assert_eq!(PointDeltaKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(PointDeltaKind::parse("unknown"), None);
    }
}
