//! Combo rules: consecutive on-time completions step up an XP multiplier.

use serde::{Deserialize, Serialize};

/// Multiplier for the current combo: steps up every 3rd on-time completion.
/// Combo 0-2 -> 1x, 3-5 -> 2x, 6-8 -> 3x, and so on.
pub fn combo_multiplier(current_combo: u32) -> u32 {
    current_combo / 3 + 1
}

/// Base points scaled by the combo multiplier.
pub fn apply_combo_bonus(base_points: i64, current_combo: u32) -> i64 {
    base_points * combo_multiplier(current_combo) as i64
}

/// The top-up over the base award.
///
/// The completion trigger already grants the base points, so callers credit
/// only this delta to avoid double-counting.
pub fn combo_bonus_delta(base_points: i64, current_combo: u32) -> i64 {
    apply_combo_bonus(base_points, current_combo) - base_points
}

/// Result of feeding one completion into the combo state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboUpdate {
    pub current_combo: u32,
    pub highest_combo: u32,
    /// True when a late completion reset a non-zero combo.
    pub broken: bool,
}

/// Advance the combo state for one completion.
///
/// On-time completions increment the combo and raise the high-water mark;
/// late completions reset the combo to 0 and leave the high-water mark alone.
pub fn on_completion(current_combo: u32, highest_combo: u32, on_time: bool) -> ComboUpdate {
    if on_time {
        let combo = current_combo + 1;
        ComboUpdate {
            current_combo: combo,
            highest_combo: highest_combo.max(combo),
            broken: false,
        }
    } else {
        ComboUpdate {
            current_combo: 0,
            highest_combo,
            broken: current_combo > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_steps() {
        assert_eq!(combo_multiplier(0), 1);
        assert_eq!(combo_multiplier(2), 1);
        assert_eq!(combo_multiplier(3), 2);
        assert_eq!(combo_multiplier(5), 2);
        assert_eq!(combo_multiplier(6), 3);
        assert_eq!(combo_multiplier(8), 3);
        assert_eq!(combo_multiplier(9), 4);
    }

    #[test]
    fn test_apply_bonus() {
        assert_eq!(apply_combo_bonus(100, 0), 100);
        assert_eq!(apply_combo_bonus(100, 3), 200);
        assert_eq!(apply_combo_bonus(50, 6), 150);
    }

    #[test]
    fn test_bonus_delta_excludes_base() {
        assert_eq!(combo_bonus_delta(100, 0), 0);
        assert_eq!(combo_bonus_delta(100, 3), 100);
        assert_eq!(combo_bonus_delta(30, 9), 90);
    }

    #[test]
    fn test_on_time_raises_high_water_mark() {
        let update = on_completion(4, 4, true);
        assert_eq!(update.current_combo, 5);
        assert_eq!(update.highest_combo, 5);
        assert!(!update.broken);
    }

    #[test]
    fn test_late_resets_but_keeps_high_water_mark() {
        let update = on_completion(7, 9, false);
        assert_eq!(update.current_combo, 0);
        assert_eq!(update.highest_combo, 9);
        assert!(update.broken);
    }

    #[test]
    fn test_late_with_zero_combo_is_not_a_break() {
        let update = on_completion(0, 3, false);
        assert_eq!(update.current_combo, 0);
        assert!(!update.broken);
    }
}
