//! End-to-end tests for the completion trigger, daily reward, and unlocks.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use quest_common::rpc::CreateTaskParams;
use quest_common::scoring::Priority;
use quest_common::QuestError;
use questd::engine;
use questd::store::Store;

fn open_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("quest.db")).unwrap();
    (dir, store)
}

fn make_task(
    store: &Store,
    user: Uuid,
    priority: Priority,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Uuid {
    let task = engine::new_task(
        user,
        CreateTaskParams {
            title: "task".to_string(),
            description: None,
            deadline,
            priority,
            category: None,
        },
        now,
    );
    store.create_task(&task).unwrap();
    task.id
}

#[test]
fn test_completion_credits_base_and_first_badge() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();
    let task_id = make_task(&store, user, Priority::Urgent, now + Duration::hours(1), now);

    let result = engine::complete_task(&store, user, task_id, now).unwrap();

    assert_eq!(result.points_earned, 50);
    assert!(result.on_time);
    assert_eq!(result.current_combo, 1);
    assert_eq!(result.combo_multiplier, 1);
    assert_eq!(result.bonus_points, 0);
    assert_eq!(result.current_streak, 1);
    assert!(result.new_badges.iter().any(|b| b.id == "first_task"));
    // Base 50 plus the First Steps badge reward of 10.
    assert_eq!(result.total_points, 60);
}

#[test]
fn test_completing_twice_is_rejected() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();
    let task_id = make_task(&store, user, Priority::Low, now + Duration::hours(1), now);

    engine::complete_task(&store, user, task_id, now).unwrap();
    let err = engine::complete_task(&store, user, task_id, now).unwrap_err();
    assert!(matches!(err, QuestError::AlreadyCompleted(_)));

    // Counters were not double-bumped.
    let profile = store.get_or_create_profile(user).unwrap();
    assert_eq!(profile.tasks_completed, 1);
}

#[test]
fn test_combo_multiplier_kicks_in_on_third_on_time_completion() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    for expected_combo in 1..=2 {
        let id = make_task(&store, user, Priority::Medium, now + Duration::hours(1), now);
        let result = engine::complete_task(&store, user, id, now).unwrap();
        assert_eq!(result.current_combo, expected_combo);
        assert_eq!(result.bonus_points, 0);
    }

    let id = make_task(&store, user, Priority::Medium, now + Duration::hours(1), now);
    let result = engine::complete_task(&store, user, id, now).unwrap();
    assert_eq!(result.current_combo, 3);
    assert_eq!(result.combo_multiplier, 2);
    // 20 base at 2x: the top-up over the base is another 20.
    assert_eq!(result.bonus_points, 20);
}

#[test]
fn test_late_completion_breaks_combo_but_keeps_high_water_mark() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    for _ in 0..4 {
        let id = make_task(&store, user, Priority::Low, now + Duration::hours(1), now);
        engine::complete_task(&store, user, id, now).unwrap();
    }

    let late = make_task(&store, user, Priority::Low, now - Duration::hours(1), now);
    let result = engine::complete_task(&store, user, late, now).unwrap();

    assert!(!result.on_time);
    assert!(result.combo_broken);
    assert_eq!(result.current_combo, 0);
    assert_eq!(result.bonus_points, 0);
    // Base award is still granted for a late completion.
    assert_eq!(result.points_earned, 10);

    let profile = store.get_or_create_profile(user).unwrap();
    assert_eq!(profile.highest_combo, 4);
}

#[test]
fn test_badge_unlocks_exactly_once_across_completions() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    let mut unlock_count = 0;
    for _ in 0..11 {
        let id = make_task(&store, user, Priority::Low, now + Duration::hours(1), now);
        let result = engine::complete_task(&store, user, id, now).unwrap();
        unlock_count += result
            .new_badges
            .iter()
            .filter(|b| b.id == "ten_tasks")
            .count();
    }
    assert_eq!(unlock_count, 1);

    let badges = engine::badges_view(&store, user, now).unwrap();
    let ten = badges.iter().find(|b| b.badge.id == "ten_tasks").unwrap();
    assert!(ten.unlocked);
}

#[test]
fn test_streak_across_days() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let day1 = Utc::now();
    let day2 = day1 + Duration::days(1);
    let day4 = day1 + Duration::days(3);

    let id = make_task(&store, user, Priority::Low, day1 + Duration::hours(1), day1);
    assert_eq!(engine::complete_task(&store, user, id, day1).unwrap().current_streak, 1);

    let id = make_task(&store, user, Priority::Low, day2 + Duration::hours(1), day2);
    assert_eq!(engine::complete_task(&store, user, id, day2).unwrap().current_streak, 2);

    // A two-day gap restarts the streak; the longest streak survives.
    let id = make_task(&store, user, Priority::Low, day4 + Duration::hours(1), day4);
    assert_eq!(engine::complete_task(&store, user, id, day4).unwrap().current_streak, 1);

    let profile = store.get_or_create_profile(user).unwrap();
    assert_eq!(profile.longest_streak, 2);
}

#[test]
fn test_daily_reward_claim_once_per_day() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    let first = engine::claim_daily(&store, user, now).unwrap();
    assert!(first.claimed);
    assert_eq!(first.reward, 20);
    assert_eq!(first.total_points, 20);

    let second = engine::claim_daily(&store, user, now).unwrap();
    assert!(!second.claimed);
    assert_eq!(second.reward, 0);
    assert_eq!(second.total_points, 20);
}

#[test]
fn test_daily_reward_scales_with_streak() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    // Build a streak of 1 by completing a task, then claim.
    let id = make_task(&store, user, Priority::Low, now + Duration::hours(1), now);
    engine::complete_task(&store, user, id, now).unwrap();

    let result = engine::claim_daily(&store, user, now).unwrap();
    assert!(result.claimed);
    assert_eq!(result.reward, 25);
}

#[test]
fn test_avatar_selection_requires_unlock() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    let err = engine::select_avatar(&store, user, "gold-champion", now).unwrap_err();
    assert!(matches!(err, QuestError::AvatarLocked(_)));

    let err = engine::select_avatar(&store, user, "no-such-avatar", now).unwrap_err();
    assert!(matches!(err, QuestError::UnknownAvatar(_)));

    // The starter avatar has a zero requirement and is always selectable.
    let profile = engine::select_avatar(&store, user, "default-1", now).unwrap();
    assert_eq!(profile.selected_avatar_id.as_deref(), Some("default-1"));
}

#[test]
fn test_profile_view_levels() {
    let (_dir, store) = open_store();
    let user = Uuid::new_v4();
    let now = Utc::now();

    let view = engine::profile_view(&store, user).unwrap();
    assert_eq!(view.level.level, 1);
    assert_eq!(view.level.name, "Novice");
    assert_eq!(view.points_to_next, 100);

    // One urgent completion (50 XP + 10 badge reward) stays in Novice.
    let id = make_task(&store, user, Priority::Urgent, now + Duration::hours(1), now);
    engine::complete_task(&store, user, id, now).unwrap();
    let view = engine::profile_view(&store, user).unwrap();
    assert_eq!(view.level.level, 1);
    assert_eq!(view.points_to_next, 40);
}
