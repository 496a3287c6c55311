//! Overdue penalty rule for the scheduled sweep.

use chrono::{DateTime, Utc};

use crate::models::Task;

/// Penalty for missing a task's deadline: 20% of its point value, floor 5 XP.
pub fn penalty_for(task_points: i64) -> i64 {
    (task_points * 20 / 100).max(5)
}

/// Whether the sweep may charge this task right now.
///
/// Eligible only while incomplete, past deadline, and not yet penalized;
/// `penalty_applied` makes the charge at-most-once.
pub fn is_penalizable(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.deadline < now && !task.penalty_applied
}

/// Points remaining after a penalty, clamped at zero.
pub fn apply_penalty(total_points: i64, penalty: i64) -> i64 {
    (total_points - penalty).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Priority;
    use chrono::Duration;
    use uuid::Uuid;

    fn task(completed: bool, overdue: bool, penalty_applied: bool, now: DateTime<Utc>) -> Task {
        let deadline = if overdue { now - Duration::hours(1) } else { now + Duration::hours(1) };
        Task {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            deadline,
            priority: Priority::Medium,
            category: None,
            points: 20,
            completed,
            completed_at: None,
            penalty_applied,
            created_at: now,
        }
    }

    #[test]
    fn test_penalty_amounts() {
        assert_eq!(penalty_for(50), 10);
        assert_eq!(penalty_for(30), 6);
        // Floor of 5 XP.
        assert_eq!(penalty_for(10), 5);
        assert_eq!(penalty_for(0), 5);
    }

    #[test]
    fn test_eligibility() {
        let now = Utc::now();
        assert!(is_penalizable(&task(false, true, false, now), now));
        assert!(!is_penalizable(&task(true, true, false, now), now));
        assert!(!is_penalizable(&task(false, false, false, now), now));
        // Already charged once: never again.
        assert!(!is_penalizable(&task(false, true, true, now), now));
    }

    #[test]
    fn test_points_never_go_negative() {
        assert_eq!(apply_penalty(100, 10), 90);
        assert_eq!(apply_penalty(3, 10), 0);
        assert_eq!(apply_penalty(0, 5), 0);
    }
}
