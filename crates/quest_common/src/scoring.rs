//! Task priority and the priority -> XP mapping.

use serde::{Deserialize, Deserializer, Serialize};

/// Task priority. Unrecognized values deserialize as Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Priority::parse_lossy(&s))
    }
}

impl Priority {
    /// Base XP awarded for completing a task of this priority.
    pub fn points(self) -> i64 {
        match self {
            Priority::Low => 10,
            Priority::Medium => 20,
            Priority::High => 30,
            Priority::Urgent => 50,
        }
    }

    /// Parse a priority string, falling back to Medium for anything unknown.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// Priority -> XP table. Total; unknown priorities are worth 20.
pub fn points_for_priority(priority: Priority) -> i64 {
    priority.points()
}
