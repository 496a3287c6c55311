//! Badge and avatar unlock evaluation.
//!
//! The evaluator only decides; persisting unlock records (and enforcing
//! at-most-once) is the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Which profile counter an unlock requirement reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    TasksCompleted,
    CurrentStreak,
    TotalPoints,
    HighestCombo,
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TasksCompleted => write!(f, "tasks completed"),
            Self::CurrentStreak => write!(f, "day streak"),
            Self::TotalPoints => write!(f, "total XP"),
            Self::HighestCombo => write!(f, "best combo"),
        }
    }
}

/// The profile counters unlock requirements are evaluated against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub tasks_completed: i64,
    pub current_streak: u32,
    pub total_points: i64,
    pub highest_combo: u32,
}

impl ProfileSnapshot {
    pub fn value_of(&self, requirement: Requirement) -> i64 {
        match requirement {
            Requirement::TasksCompleted => self.tasks_completed,
            Requirement::CurrentStreak => self.current_streak as i64,
            Requirement::TotalPoints => self.total_points,
            Requirement::HighestCombo => self.highest_combo as i64,
        }
    }
}

/// Avatar rarity, display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Uncommon => write!(f, "uncommon"),
            Self::Rare => write!(f, "rare"),
            Self::Epic => write!(f, "epic"),
            Self::Legendary => write!(f, "legendary"),
        }
    }
}

/// A badge definition from the static catalog. Badges carry a reward XP
/// granted once on unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirement: Requirement,
    pub requirement_value: i64,
    pub points: i64,
}

/// An avatar definition from the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub requirement: Requirement,
    pub requirement_value: i64,
    pub rarity: Rarity,
}

/// Anything with a threshold requirement that can be unlocked once.
pub trait Unlockable {
    fn id(&self) -> &str;
    fn requirement(&self) -> Requirement;
    fn requirement_value(&self) -> i64;
}

impl Unlockable for Badge {
    fn id(&self) -> &str {
        &self.id
    }
    fn requirement(&self) -> Requirement {
        self.requirement
    }
    fn requirement_value(&self) -> i64 {
        self.requirement_value
    }
}

impl Unlockable for Avatar {
    fn id(&self) -> &str {
        &self.id
    }
    fn requirement(&self) -> Requirement {
        self.requirement
    }
    fn requirement_value(&self) -> i64 {
        self.requirement_value
    }
}

/// Definitions whose requirement is newly satisfied by `profile`.
///
/// Already-unlocked ids are skipped, so re-evaluating with the same unlocked
/// set never re-reports an unlock. Output preserves catalog order.
pub fn evaluate_unlocks<'a, T: Unlockable>(
    profile: &ProfileSnapshot,
    catalog: &'a [T],
    unlocked: &HashSet<String>,
) -> Vec<&'a T> {
    catalog
        .iter()
        .filter(|def| !unlocked.contains(def.id()))
        .filter(|def| profile.value_of(def.requirement()) >= def.requirement_value())
        .collect()
}
