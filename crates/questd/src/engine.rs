//! Game-mechanics orchestration over the store.
//!
//! The pure rules live in quest_common; this module wires them to
//! persistence. The completion trigger is one atomic store transaction;
//! the combo top-up and unlock evaluation are layered on top of it, and a
//! combo failure is non-fatal (the completion stands).

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use quest_common::catalog;
use quest_common::challenges::{self, UserChallenge};
use quest_common::combo;
use quest_common::ledger::{PointDelta, PointDeltaKind};
use quest_common::levels;
use quest_common::models::{Profile, Task};
use quest_common::rpc::{
    AvatarStatus, BadgeStatus, ChallengeStatus, ClaimDailyResult, CompletionResult,
    CreateTaskParams, LevelView, ProfileView,
};
use quest_common::streak;
use quest_common::unlocks::{self, Avatar, Badge};
use quest_common::QuestError;

use crate::store::Store;

/// Build a task from creation params; points come from the priority table.
pub fn new_task(owner: Uuid, params: CreateTaskParams, now: DateTime<Utc>) -> Task {
    Task {
        id: Uuid::new_v4(),
        owner,
        points: params.priority.points(),
        title: params.title,
        description: params.description,
        deadline: params.deadline,
        priority: params.priority,
        category: params.category,
        completed: false,
        completed_at: None,
        penalty_applied: false,
        created_at: now,
    }
}

/// The completion trigger.
///
/// Transactionally marks the task completed, credits the base award, and
/// advances the streak. Then, outside the transaction: combo update and
/// bonus top-up (non-fatal on failure), badge/avatar unlocks, and challenge
/// progress.
pub fn complete_task(
    store: &Store,
    user: Uuid,
    task_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CompletionResult, QuestError> {
    let task = store.get_task(user, task_id)?;
    if task.completed {
        return Err(QuestError::AlreadyCompleted(task_id.to_string()));
    }
    let on_time = now <= task.deadline;

    let before = store.get_or_create_profile(user)?;
    let streak_update = streak::on_completion(
        before.current_streak,
        before.longest_streak,
        before.last_completed_date,
        now.date_naive(),
    );
    let base = PointDelta::new(user, PointDeltaKind::TaskCompletion, task.points)
        .with_reference(task_id.to_string());

    let mut profile = store.apply_completion(task_id, now, &streak_update, &base)?;
    info!(
        "task {} completed: +{} XP ({}), streak {}",
        task_id,
        task.points,
        if on_time { "on time" } else { "late" },
        profile.current_streak
    );

    // Combo step. Not atomic with the trigger; a failure here is logged and
    // the completion stands with no bonus.
    let combo_update = combo::on_completion(profile.current_combo, profile.highest_combo, on_time);
    let mut bonus_points = 0;
    match store.update_combo(user, &combo_update) {
        Ok(()) => {
            profile.current_combo = combo_update.current_combo;
            profile.highest_combo = combo_update.highest_combo;
            if on_time {
                let delta = combo::combo_bonus_delta(task.points, combo_update.current_combo);
                if delta > 0 {
                    let bonus = PointDelta::new(user, PointDeltaKind::ComboBonus, delta)
                        .with_reference(task_id.to_string());
                    match store.apply_delta(&bonus) {
                        Ok(total) => {
                            bonus_points = delta;
                            profile.total_points = total;
                        }
                        Err(e) => warn!("combo bonus not credited for task {}: {}", task_id, e),
                    }
                }
            }
        }
        Err(e) => warn!("combo update failed for task {} (completion stands): {}", task_id, e),
    }

    let new_badges = award_new_badges(store, &mut profile, now)?;
    let new_avatars = unlock_new_avatars(store, &profile, now)?;
    let completed_challenges = record_challenge_progress(store, &mut profile, now)?;

    Ok(CompletionResult {
        task_id,
        points_earned: task.points,
        bonus_points,
        on_time,
        current_combo: profile.current_combo,
        combo_multiplier: combo::combo_multiplier(profile.current_combo),
        combo_broken: combo_update.broken,
        current_streak: profile.current_streak,
        new_badges,
        new_avatars,
        completed_challenges,
        total_points: profile.total_points,
    })
}

/// Evaluate badge unlocks and persist the newly earned ones, crediting each
/// badge's reward XP through the ledger. The unique (user, badge) row makes
/// the unlock at-most-once even under concurrent evaluation.
pub fn award_new_badges(
    store: &Store,
    profile: &mut Profile,
    now: DateTime<Utc>,
) -> Result<Vec<Badge>, QuestError> {
    let catalog = catalog::all_badges();
    let unlocked = store.unlocked_badges(profile.id)?;
    let mut earned = Vec::new();

    for badge in unlocks::evaluate_unlocks(&profile.snapshot(), &catalog, &unlocked) {
        if !store.insert_badge_unlock(profile.id, &badge.id, now)? {
            continue;
        }
        if badge.points > 0 {
            let reward = PointDelta::new(profile.id, PointDeltaKind::BadgeReward, badge.points)
                .with_reference(badge.id.clone());
            profile.total_points = store.apply_delta(&reward)?;
        }
        info!("badge unlocked for {}: {}", profile.id, badge.id);
        earned.push(badge.clone());
    }
    Ok(earned)
}

/// Evaluate avatar unlocks and persist the newly earned ones. Avatars carry
/// no reward XP.
pub fn unlock_new_avatars(
    store: &Store,
    profile: &Profile,
    now: DateTime<Utc>,
) -> Result<Vec<Avatar>, QuestError> {
    let catalog = catalog::all_avatars();
    let unlocked = store.unlocked_avatars(profile.id)?;
    let mut earned = Vec::new();

    for avatar in unlocks::evaluate_unlocks(&profile.snapshot(), &catalog, &unlocked) {
        if store.insert_avatar_unlock(profile.id, &avatar.id, now)? {
            info!("avatar unlocked for {}: {}", profile.id, avatar.id);
            earned.push(avatar.clone());
        }
    }
    Ok(earned)
}

fn record_challenge_progress(
    store: &Store,
    profile: &mut Profile,
    now: DateTime<Utc>,
) -> Result<Vec<quest_common::challenges::Challenge>, QuestError> {
    let mut completed = Vec::new();
    for challenge in catalog::all_challenges() {
        if !challenge.is_active(now) {
            continue;
        }
        let row = store.user_challenge(profile.id, &challenge.id)?;
        let update = challenges::record_progress(&challenge, &row, 1, now);
        if update.progress == row.progress && update.completed == row.completed {
            continue;
        }
        store.upsert_user_challenge(&UserChallenge {
            user_id: profile.id,
            challenge_id: challenge.id.clone(),
            progress: update.progress,
            completed: update.completed,
        })?;
        if update.newly_completed {
            let reward =
                PointDelta::new(profile.id, PointDeltaKind::ChallengeReward, challenge.points)
                    .with_reference(challenge.id.clone());
            profile.total_points = store.apply_delta(&reward)?;
            info!("challenge completed for {}: {}", profile.id, challenge.id);
            completed.push(challenge);
        }
    }
    Ok(completed)
}

/// Claim today's daily reward. A second claim on the same calendar day is a
/// no-op reported as `claimed: false`.
pub fn claim_daily(store: &Store, user: Uuid, now: DateTime<Utc>) -> Result<ClaimDailyResult, QuestError> {
    let profile = store.get_or_create_profile(user)?;
    let today = now.date_naive();
    let reward = streak::daily_reward(profile.current_streak);

    if !streak::can_claim(profile.last_claimed_date, today) {
        return Ok(ClaimDailyResult {
            claimed: false,
            reward: 0,
            current_streak: profile.current_streak,
            total_points: profile.total_points,
        });
    }

    let delta = PointDelta::new(user, PointDeltaKind::DailyReward, reward);
    let claimed = store.claim_daily(&delta, today)?;
    let profile = store.get_or_create_profile(user)?;

    Ok(ClaimDailyResult {
        claimed,
        reward: if claimed { reward } else { 0 },
        current_streak: profile.current_streak,
        total_points: profile.total_points,
    })
}

/// Select an avatar; it must exist in the catalog and be unlocked.
pub fn select_avatar(
    store: &Store,
    user: Uuid,
    avatar_id: &str,
    now: DateTime<Utc>,
) -> Result<Profile, QuestError> {
    let catalog = catalog::all_avatars();
    if !catalog.iter().any(|a| a.id == avatar_id) {
        return Err(QuestError::UnknownAvatar(avatar_id.to_string()));
    }

    let profile = store.get_or_create_profile(user)?;
    // Pick up anything newly eligible before refusing.
    unlock_new_avatars(store, &profile, now)?;

    if !store.unlocked_avatars(user)?.contains(avatar_id) {
        return Err(QuestError::AvatarLocked(avatar_id.to_string()));
    }
    store.set_selected_avatar(user, avatar_id)?;
    store.get_or_create_profile(user)
}

/// Profile plus derived level info for display.
pub fn profile_view(store: &Store, user: Uuid) -> Result<ProfileView, QuestError> {
    let profile = store.get_or_create_profile(user)?;
    let level = levels::level_for(profile.total_points);
    Ok(ProfileView {
        level: LevelView {
            level: level.level,
            name: level.name.to_string(),
            min_points: level.min_points,
            max_points: level.max_points,
        },
        progress_pct: levels::progress_to_next_level(profile.total_points),
        points_to_next: levels::points_to_next_level(profile.total_points),
        profile,
    })
}

/// Badge catalog with unlock state, refreshing unlocks first so thresholds
/// crossed by rewards or penalties are reflected.
pub fn badges_view(store: &Store, user: Uuid, now: DateTime<Utc>) -> Result<Vec<BadgeStatus>, QuestError> {
    let mut profile = store.get_or_create_profile(user)?;
    award_new_badges(store, &mut profile, now)?;
    let unlocked = store.unlocked_badges(user)?;
    Ok(catalog::all_badges()
        .into_iter()
        .map(|badge| {
            let is_unlocked = unlocked.contains(&badge.id);
            BadgeStatus { badge, unlocked: is_unlocked }
        })
        .collect())
}

/// Avatar catalog with unlock and selection state, refreshing unlocks first.
pub fn avatars_view(store: &Store, user: Uuid, now: DateTime<Utc>) -> Result<Vec<AvatarStatus>, QuestError> {
    let profile = store.get_or_create_profile(user)?;
    unlock_new_avatars(store, &profile, now)?;
    let unlocked = store.unlocked_avatars(user)?;
    Ok(catalog::all_avatars()
        .into_iter()
        .map(|avatar| {
            let is_unlocked = unlocked.contains(&avatar.id);
            let selected = profile.selected_avatar_id.as_deref() == Some(avatar.id.as_str());
            AvatarStatus { avatar, unlocked: is_unlocked, selected }
        })
        .collect())
}

/// Active and past challenges with this user's progress.
pub fn challenges_view(store: &Store, user: Uuid) -> Result<Vec<ChallengeStatus>, QuestError> {
    catalog::all_challenges()
        .into_iter()
        .map(|challenge| {
            let row = store.user_challenge(user, &challenge.id)?;
            Ok(ChallengeStatus {
                challenge,
                progress: row.progress,
                completed: row.completed,
            })
        })
        .collect()
}
