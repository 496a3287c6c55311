//! Built-in badge, avatar, and challenge catalogs.
//!
//! These are static, read-only inputs to the unlock evaluator. The original
//! deployment seeded them into the database; we ship them in the binary.

use chrono::{Datelike, Duration, Timelike, Utc};

use crate::challenges::Challenge;
use crate::unlocks::{Avatar, Badge, Rarity, Requirement};

fn badge(
    id: &str,
    name: &str,
    description: &str,
    requirement: Requirement,
    requirement_value: i64,
    points: i64,
) -> Badge {
    Badge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        requirement,
        requirement_value,
        points,
    }
}

fn avatar(id: &str, name: &str, requirement: Requirement, value: i64, rarity: Rarity) -> Avatar {
    Avatar {
        id: id.to_string(),
        name: name.to_string(),
        requirement,
        requirement_value: value,
        rarity,
    }
}

/// All badge definitions, in display order.
pub fn all_badges() -> Vec<Badge> {
    use Requirement::*;
    vec![
        // Milestone badges
        badge("first_task", "First Steps", "Complete your first task", TasksCompleted, 1, 10),
        badge("ten_tasks", "Getting Things Done", "Complete 10 tasks", TasksCompleted, 10, 25),
        badge("fifty_tasks", "Taskmaster", "Complete 50 tasks", TasksCompleted, 50, 50),
        badge("hundred_tasks", "Centurion", "Complete 100 tasks", TasksCompleted, 100, 100),
        badge("five_hundred_tasks", "Unstoppable", "Complete 500 tasks", TasksCompleted, 500, 250),
        // Streak badges
        badge("streak_3", "On Fire", "Keep a 3-day streak", CurrentStreak, 3, 15),
        badge("streak_7", "Week Warrior", "Keep a 7-day streak", CurrentStreak, 7, 35),
        badge("streak_30", "Monthly Master", "Keep a 30-day streak", CurrentStreak, 30, 150),
        // Points badges
        badge("points_100", "Collector", "Earn 100 XP", TotalPoints, 100, 10),
        badge("points_1000", "Hoarder", "Earn 1,000 XP", TotalPoints, 1000, 50),
        badge("points_10000", "Tycoon", "Earn 10,000 XP", TotalPoints, 10000, 200),
    ]
}

/// All avatar definitions, in unlock order.
pub fn all_avatars() -> Vec<Avatar> {
    use Requirement::*;
    vec![
        avatar("default-1", "Starter", TasksCompleted, 0, Rarity::Common),
        avatar("bronze-achiever", "Bronze Achiever", TasksCompleted, 10, Rarity::Common),
        avatar("silver-star", "Silver Star", TasksCompleted, 25, Rarity::Uncommon),
        avatar("gold-champion", "Gold Champion", TasksCompleted, 50, Rarity::Rare),
        avatar("platinum-master", "Platinum Master", TasksCompleted, 100, Rarity::Epic),
        avatar("streak-warrior", "Streak Warrior", CurrentStreak, 7, Rarity::Rare),
        avatar("combo-king", "Combo King", HighestCombo, 10, Rarity::Epic),
        avatar("point-collector", "Point Collector", TotalPoints, 1000, Rarity::Uncommon),
        avatar("elite-performer", "Elite Performer", TotalPoints, 5000, Rarity::Epic),
        avatar("legendary-hero", "Legendary Hero", TotalPoints, 20000, Rarity::Legendary),
    ]
}

/// The rolling challenge set. Windows are anchored to the current week so a
/// fresh install always has something active.
pub fn all_challenges() -> Vec<Challenge> {
    let now = Utc::now();
    let week_start = now - Duration::days(now.date_naive().weekday().num_days_from_monday() as i64)
        - Duration::seconds(now.time().num_seconds_from_midnight() as i64);
    let week_end = week_start + Duration::days(7);

    vec![
        Challenge {
            id: "weekly-five".to_string(),
            name: "Weekly Five".to_string(),
            description: "Complete 5 tasks this week".to_string(),
            target_value: 5,
            points: 50,
            starts_at: week_start,
            ends_at: week_end,
        },
        Challenge {
            id: "weekly-fifteen".to_string(),
            name: "Power Week".to_string(),
            description: "Complete 15 tasks this week".to_string(),
            target_value: 15,
            points: 150,
            starts_at: week_start,
            ends_at: week_end,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_badge_ids_unique() {
        let badges = all_badges();
        let ids: HashSet<_> = badges.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids.len(), badges.len());
    }

    #[test]
    fn test_avatar_ids_unique() {
        let avatars = all_avatars();
        let ids: HashSet<_> = avatars.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), avatars.len());
    }

    #[test]
    fn test_default_avatar_unlocks_immediately() {
        let avatars = all_avatars();
        let starter = avatars.iter().find(|a| a.id == "default-1").unwrap();
        assert_eq!(starter.requirement_value, 0);
    }

    #[test]
    fn test_challenges_currently_active() {
        let now = Utc::now();
        for ch in all_challenges() {
            assert!(ch.is_active(now), "{} should be active", ch.id);
        }
    }
}
