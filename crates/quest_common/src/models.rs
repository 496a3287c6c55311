//! Core domain records: tasks, profiles, and the category catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::Priority;
use crate::unlocks::ProfileSnapshot;

/// Fixed task category catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Work,
    Study,
    Personal,
    Home,
    Shopping,
    Fitness,
    Creative,
    Social,
    Projects,
    Development,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Work,
        Category::Study,
        Category::Personal,
        Category::Home,
        Category::Shopping,
        Category::Fitness,
        Category::Creative,
        Category::Social,
        Category::Projects,
        Category::Development,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.to_string() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Work => "work",
            Category::Study => "study",
            Category::Personal => "personal",
            Category::Home => "home",
            Category::Shopping => "shopping",
            Category::Fitness => "fitness",
            Category::Creative => "creative",
            Category::Social => "social",
            Category::Projects => "projects",
            Category::Development => "development",
        };
        write!(f, "{}", name)
    }
}

/// A task owned by one user. `points` is assigned at creation from the
/// priority table and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
    pub category: Option<Category>,
    pub points: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// True once the overdue sweep has charged this task; at most once.
    pub penalty_applied: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline < now
    }
}

/// Filter for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

/// Per-user cumulative counters. One row per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub total_points: i64,
    pub tasks_completed: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub current_combo: u32,
    pub highest_combo: u32,
    pub selected_avatar_id: Option<String>,
    pub last_completed_date: Option<NaiveDate>,
    pub last_claimed_date: Option<NaiveDate>,
}

impl Profile {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            total_points: 0,
            tasks_completed: 0,
            current_streak: 0,
            longest_streak: 0,
            current_combo: 0,
            highest_combo: 0,
            selected_avatar_id: None,
            last_completed_date: None,
            last_claimed_date: None,
        }
    }

    /// Counters the unlock evaluator reads.
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            tasks_completed: self.tasks_completed,
            current_streak: self.current_streak,
            total_points: self.total_points,
            highest_combo: self.highest_combo,
        }
    }
}
