//! Display helpers for questctl output.

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use quest_common::models::Task;
use quest_common::rpc::{
    AvatarStatus, BadgeStatus, ChallengeStatus, ClaimDailyResult, CompletionResult, DaemonStatus,
    ProfileView, SweepReport,
};
use quest_common::unlocks::Rarity;

fn format_deadline(deadline: DateTime<Utc>) -> String {
    deadline.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Print a task table.
pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let now = Utc::now();
    let title_width = tasks
        .iter()
        .map(|t| console::measure_text_width(&t.title))
        .max()
        .unwrap_or(0);

    for task in tasks {
        let marker = if task.completed {
            "[x]".green().to_string()
        } else if task.is_overdue(now) {
            "[!]".red().to_string()
        } else {
            "[ ]".to_string()
        };

        let category = task
            .category
            .map(|c| format!(" #{}", c))
            .unwrap_or_default();

        let points = format!("{:>3} XP", task.points);
        println!(
            "{} {}  {}  {}  {:<7} {}{}",
            marker,
            (&task.id.to_string()[..8]).dimmed(),
            console::pad_str(&task.title, title_width, console::Alignment::Left, None).bold(),
            points.yellow(),
            task.priority.to_string(),
            format_deadline(task.deadline).dimmed(),
            category.cyan(),
        );
    }
}

/// Print the result of completing a task: base award, combo, unlocks.
pub fn print_completion(result: &CompletionResult) {
    if result.on_time {
        println!("{} +{} XP", "Task complete!".green().bold(), result.points_earned);
    } else {
        println!("{} +{} XP (late)", "Task complete.".yellow(), result.points_earned);
    }

    if result.bonus_points > 0 {
        println!(
            "{} {}x combo, {}x XP multiplier: +{} bonus XP",
            "Combo!".yellow().bold(),
            result.current_combo,
            result.combo_multiplier,
            result.bonus_points
        );
    } else if result.combo_broken {
        println!("{} Complete tasks on time to keep the multiplier.", "Combo broken.".red());
    }

    for badge in &result.new_badges {
        println!(
            "{} {} - {} (+{} XP)",
            "Badge unlocked:".magenta().bold(),
            badge.name,
            badge.description,
            badge.points
        );
    }
    for avatar in &result.new_avatars {
        println!("{} {} ({})", "Avatar unlocked:".cyan().bold(), avatar.name, avatar.rarity);
    }
    for challenge in &result.completed_challenges {
        println!(
            "{} {} (+{} XP)",
            "Challenge complete:".green().bold(),
            challenge.name,
            challenge.points
        );
    }

    println!("Streak: {} days | Total: {} XP", result.current_streak, result.total_points);
}

fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Print profile, level, streak, and combo.
pub fn print_profile(view: &ProfileView) {
    let profile = &view.profile;
    println!(
        "\nLevel {} {}  {} XP",
        view.level.level.bold(),
        view.level.name.bold(),
        profile.total_points.yellow()
    );

    match view.level.max_points {
        Some(_) => println!(
            "{} {:.0}%  ({} XP to next level)",
            progress_bar(view.progress_pct, 24),
            view.progress_pct,
            view.points_to_next
        ),
        None => println!("{} max level", progress_bar(100.0, 24)),
    }

    println!(
        "\nTasks completed: {}\nStreak: {} days (best {})\nCombo: {} (best {})",
        profile.tasks_completed,
        profile.current_streak,
        profile.longest_streak,
        profile.current_combo,
        profile.highest_combo
    );
    if let Some(avatar) = &profile.selected_avatar_id {
        println!("Avatar: {}", avatar.cyan());
    }
}

pub fn print_claim(result: &ClaimDailyResult) {
    if result.claimed {
        println!(
            "{} +{} XP (streak {} days). Total: {} XP",
            "Daily reward claimed!".green().bold(),
            result.reward,
            result.current_streak,
            result.total_points
        );
    } else {
        println!("Already claimed today. Come back tomorrow!");
    }
}

pub fn print_badges(badges: &[BadgeStatus]) {
    for status in badges {
        let marker = if status.unlocked {
            "[*]".green().to_string()
        } else {
            "[ ]".dimmed().to_string()
        };
        println!(
            "{} {}  {} (+{} XP) - needs {} {}",
            marker,
            status.badge.name.bold(),
            status.badge.description,
            status.badge.points,
            status.badge.requirement_value,
            status.badge.requirement
        );
    }
}

fn rarity_tag(rarity: Rarity) -> String {
    match rarity {
        Rarity::Common => rarity.to_string(),
        Rarity::Uncommon => rarity.green().to_string(),
        Rarity::Rare => rarity.blue().to_string(),
        Rarity::Epic => rarity.magenta().to_string(),
        Rarity::Legendary => rarity.yellow().bold().to_string(),
    }
}

pub fn print_avatars(avatars: &[AvatarStatus]) {
    for status in avatars {
        let marker = if status.selected {
            "[@]".cyan().to_string()
        } else if status.unlocked {
            "[*]".green().to_string()
        } else {
            "[ ]".dimmed().to_string()
        };
        println!(
            "{} {}  {} ({}) - needs {} {}",
            marker,
            status.avatar.id.dimmed(),
            status.avatar.name.bold(),
            rarity_tag(status.avatar.rarity),
            status.avatar.requirement_value,
            status.avatar.requirement
        );
    }
}

pub fn print_challenges(challenges: &[ChallengeStatus]) {
    for status in challenges {
        let marker = if status.completed {
            "[x]".green().to_string()
        } else {
            "[ ]".to_string()
        };
        println!(
            "{} {}  {} ({}/{}, +{} XP)",
            marker,
            status.challenge.name.bold(),
            status.challenge.description,
            status.progress,
            status.challenge.target_value,
            status.challenge.points
        );
    }
}

pub fn print_sweep(report: &SweepReport) {
    if report.records.is_empty() {
        println!("Sweep done: nothing to charge ({} overdue tasks scanned).", report.scanned);
        return;
    }
    for record in &report.records {
        println!(
            "{} task {}: -{} XP",
            "Penalty".red(),
            (&record.task_id.to_string()[..8]).dimmed(),
            record.penalty
        );
    }
    println!("Sweep done: charged {} of {} tasks.", report.records.len(), report.scanned);
}

pub fn print_status(status: &DaemonStatus) {
    println!("questd v{}", status.version);
    println!("uptime:         {}s", status.uptime_seconds);
    println!("pending tasks:  {}", status.pending_tasks);
    println!("sweep interval: {}s", status.sweep_interval_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 10), "[----------]");
        assert_eq!(progress_bar(100.0, 10), "[##########]");
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
    }
}
