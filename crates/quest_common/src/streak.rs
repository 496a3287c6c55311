//! Daily streak rules and the daily login reward.
//!
//! Streaks count consecutive calendar days with at least one completion.
//! The daily reward may be claimed once per calendar day; a second claim on
//! the same day is a no-op, not an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily reward size: base 20 XP plus 5 per streak day, bonus capped at 100.
pub fn daily_reward(current_streak: u32) -> i64 {
    20 + (current_streak as i64 * 5).min(100)
}

/// Whether the daily reward can be claimed today.
///
/// Claim-once is calendar-day equality, not elapsed time.
pub fn can_claim(last_claimed: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_claimed != Some(today)
}

/// Result of feeding one completion day into the streak state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Advance the streak for a completion on `today`.
///
/// A completion on the same day leaves the streak unchanged; the day after
/// the last completion extends it; any longer gap (or no history) restarts
/// at 1. The longest streak is a high-water mark.
pub fn on_completion(
    current_streak: u32,
    longest_streak: u32,
    last_completed: Option<NaiveDate>,
    today: NaiveDate,
) -> StreakUpdate {
    let current = match last_completed {
        Some(last) if last == today => current_streak.max(1),
        Some(last) if last.succ_opt() == Some(today) => current_streak + 1,
        _ => 1,
    };

    StreakUpdate {
        current_streak: current,
        longest_streak: longest_streak.max(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_reward_sizes() {
        assert_eq!(daily_reward(0), 20);
        assert_eq!(daily_reward(10), 70);
        assert_eq!(daily_reward(20), 120);
        // Bonus capped at 100.
        assert_eq!(daily_reward(100), 120);
    }

    #[test]
    fn test_claim_once_per_calendar_day() {
        let today = day("2025-06-10");
        assert!(can_claim(None, today));
        assert!(can_claim(Some(day("2025-06-09")), today));
        assert!(!can_claim(Some(today), today));
        // A stale future date (clock skew) still blocks nothing but today.
        assert!(can_claim(Some(day("2025-06-11")), today));
    }

    #[test]
    fn test_streak_extends_on_consecutive_days() {
        let update = on_completion(3, 5, Some(day("2025-06-09")), day("2025-06-10"));
        assert_eq!(update.current_streak, 4);
        assert_eq!(update.longest_streak, 5);
    }

    #[test]
    fn test_streak_same_day_unchanged() {
        let update = on_completion(3, 3, Some(day("2025-06-10")), day("2025-06-10"));
        assert_eq!(update.current_streak, 3);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let update = on_completion(9, 9, Some(day("2025-06-01")), day("2025-06-10"));
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 9);
    }

    #[test]
    fn test_first_completion_starts_streak() {
        let update = on_completion(0, 0, None, day("2025-06-10"));
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
    }
}
