//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap. Keeps argument parsing separate
//! from execution logic.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

use quest_common::models::TaskFilter;

/// Questline CLI
#[derive(Parser)]
#[command(name = "questctl")]
#[command(about = "Questline - Gamified task tracking", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to daemon socket (overrides $QUESTD_SOCKET and defaults)
    #[arg(long, global = true)]
    pub socket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Deadline, e.g. "2025-06-10 17:00" or "2025-06-10"
        #[arg(long)]
        due: String,

        /// Priority: low, medium, high, urgent
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Category: work, study, personal, home, ...
        #[arg(long)]
        category: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },

    /// List tasks
    List {
        /// Filter: all, pending, completed, overdue
        #[arg(long, default_value = "pending")]
        filter: String,
    },

    /// Complete a task and collect the rewards
    Done {
        /// Task id
        id: String,
    },

    /// Edit a task's title, deadline, description, or category
    Edit {
        /// Task id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: String,
    },

    /// Show profile, level, and progress
    Profile,

    /// Claim today's daily reward
    Claim,

    /// Show badges
    Badges,

    /// Show avatars
    Avatars,

    /// Select an unlocked avatar
    Avatar {
        /// Avatar id
        id: String,
    },

    /// Show challenges
    Challenges,

    /// Run the overdue-penalty sweep now
    Sweep,

    /// Show daemon status
    Status,
}

/// Parse a deadline as "YYYY-MM-DD HH:MM" or bare "YYYY-MM-DD" (end of day).
pub fn parse_deadline(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    if let Some(end_of_day) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
    {
        return Ok(Utc.from_utc_datetime(&end_of_day));
    }
    Err(anyhow!(
        "Cannot parse deadline '{}'. Use \"YYYY-MM-DD HH:MM\" or \"YYYY-MM-DD\".",
        s
    ))
}

/// Parse a list filter name.
pub fn parse_filter(s: &str) -> Result<TaskFilter> {
    match s {
        "all" => Ok(TaskFilter::All),
        "pending" => Ok(TaskFilter::Pending),
        "completed" => Ok(TaskFilter::Completed),
        "overdue" => Ok(TaskFilter::Overdue),
        _ => Err(anyhow!("Unknown filter '{}'. Use all, pending, completed, or overdue.", s)),
    }
}
