//! questctl - Questline command-line client
//!
//! Talks to questd over its Unix socket and renders results.

use anyhow::{anyhow, Result};
use clap::Parser;
use uuid::Uuid;

use quest_common::models::Category;
use quest_common::rpc::{CreateTaskParams, UpdateTaskParams};
use quest_common::scoring::Priority;

use questctl::cli::{parse_deadline, parse_filter, Cli, Commands};
use questctl::client::QuestdClient;
use questctl::display;

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).ok_or_else(|| {
        anyhow!(
            "Unknown category '{}'. Available: {}",
            s,
            Category::ALL.map(|c| c.to_string()).join(", ")
        )
    })
}

fn parse_task_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| anyhow!("'{}' is not a task id. Use the id from `questctl list`.", s))
}

async fn run(cli: Cli) -> Result<()> {
    let mut client = QuestdClient::connect(cli.socket.as_deref()).await?;

    match cli.command {
        Commands::Add { title, due, priority, category, description } => {
            let params = CreateTaskParams {
                title,
                description,
                deadline: parse_deadline(&due)?,
                priority: Priority::parse_lossy(&priority),
                category: category.as_deref().map(parse_category).transpose()?,
            };
            let task = client.create_task(params).await?;
            println!("Added task {} ({} XP on completion)", task.id, task.points);
        }
        Commands::List { filter } => {
            let tasks = client.list_tasks(parse_filter(&filter)?).await?;
            display::print_tasks(&tasks);
        }
        Commands::Done { id } => {
            let result = client.complete_task(parse_task_id(&id)?).await?;
            display::print_completion(&result);
        }
        Commands::Edit { id, title, due, description, category } => {
            let params = UpdateTaskParams {
                id: parse_task_id(&id)?,
                title,
                description,
                deadline: due.as_deref().map(parse_deadline).transpose()?,
                category: category.as_deref().map(parse_category).transpose()?,
            };
            let task = client.update_task(params).await?;
            println!("Updated task {}", task.id);
        }
        Commands::Rm { id } => {
            let id = parse_task_id(&id)?;
            client.delete_task(id).await?;
            println!("Deleted task {}", id);
        }
        Commands::Profile => {
            let view = client.profile().await?;
            display::print_profile(&view);
        }
        Commands::Claim => {
            let result = client.claim_daily().await?;
            display::print_claim(&result);
        }
        Commands::Badges => {
            let badges = client.badges().await?;
            display::print_badges(&badges);
        }
        Commands::Avatars => {
            let avatars = client.avatars().await?;
            display::print_avatars(&avatars);
        }
        Commands::Avatar { id } => {
            client.select_avatar(&id).await?;
            println!("Avatar set to {}", id);
        }
        Commands::Challenges => {
            let challenges = client.challenges().await?;
            display::print_challenges(&challenges);
        }
        Commands::Sweep => {
            let report = client.sweep().await?;
            display::print_sweep(&report);
        }
        Commands::Status => {
            let status = client.status().await?;
            display::print_status(&status);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
