//! Level tiers computed from cumulative XP.
//!
//! Ten fixed tiers with contiguous point ranges; the top tier is unbounded.

use serde::Serialize;

/// A level tier. `max_points` is None for the unbounded top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: u32,
    pub name: &'static str,
    pub min_points: i64,
    pub max_points: Option<i64>,
}

const fn tier(level: u32, name: &'static str, min: i64, max: Option<i64>) -> LevelInfo {
    LevelInfo { level, name, min_points: min, max_points: max }
}

/// All level tiers, sorted by `min_points`.
pub static LEVELS: [LevelInfo; 10] = [
    tier(1, "Novice", 0, Some(99)),
    tier(2, "Apprentice", 100, Some(299)),
    tier(3, "Adept", 300, Some(599)),
    tier(4, "Expert", 600, Some(999)),
    tier(5, "Master", 1000, Some(1999)),
    tier(6, "Grandmaster", 2000, Some(3999)),
    tier(7, "Legend", 4000, Some(7999)),
    tier(8, "Mythic", 8000, Some(15999)),
    tier(9, "Immortal", 16000, Some(31999)),
    tier(10, "Divine", 32000, None),
];

/// Highest tier whose minimum is at or below `total_points`.
///
/// Out-of-range input (negative points) resolves to the first tier rather
/// than panicking.
pub fn level_for(total_points: i64) -> &'static LevelInfo {
    LEVELS
        .iter()
        .rev()
        .find(|l| total_points >= l.min_points)
        .unwrap_or(&LEVELS[0])
}

/// Progress through the current tier as a percentage in [0, 100].
///
/// Returns 100 at the unbounded top tier.
pub fn progress_to_next_level(total_points: i64) -> f64 {
    let current = level_for(total_points);
    let Some(max) = current.max_points else {
        return 100.0;
    };

    let span = (max - current.min_points + 1) as f64;
    let progress = (total_points - current.min_points) as f64 / span * 100.0;
    progress.clamp(0.0, 100.0)
}

/// XP still needed to leave the current tier; 0 at the top tier.
pub fn points_to_next_level(total_points: i64) -> i64 {
    let current = level_for(total_points);
    match current.max_points {
        Some(max) => max - total_points + 1,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_contiguous() {
        for window in LEVELS.windows(2) {
            let max = window[0].max_points.expect("only the last tier is unbounded");
            assert_eq!(window[1].min_points, max + 1);
        }
        assert!(LEVELS.last().unwrap().max_points.is_none());
    }

    #[test]
    fn test_level_bounds_contain_points() {
        for points in [0, 1, 99, 100, 299, 300, 999, 4000, 31999, 32000, 1_000_000] {
            let info = level_for(points);
            assert!(info.min_points <= points);
            if let Some(max) = info.max_points {
                assert!(points <= max);
            }
        }
    }

    #[test]
    fn test_first_and_last_tier() {
        assert_eq!(level_for(0).level, 1);
        assert_eq!(level_for(0).name, "Novice");

        let top = level_for(32000);
        assert_eq!(top.level, 10);
        assert_eq!(top.name, "Divine");
        assert!(top.max_points.is_none());
        assert_eq!(progress_to_next_level(32000), 100.0);
        assert_eq!(points_to_next_level(32000), 0);
    }

    #[test]
    fn test_negative_points_resolve_to_first_tier() {
        assert_eq!(level_for(-50).level, 1);
        assert_eq!(progress_to_next_level(-50), 0.0);
    }

    #[test]
    fn test_points_to_next_level() {
        // Novice spans 0..=99, so 0 XP needs 100 more to reach Apprentice.
        assert_eq!(points_to_next_level(0), 100);
        assert_eq!(points_to_next_level(99), 1);
        assert_eq!(points_to_next_level(100), 200);
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_to_next_level(0), 0.0);
        assert!((progress_to_next_level(50) - 50.0).abs() < 0.01);
        assert!(progress_to_next_level(99) < 100.0);
    }
}
