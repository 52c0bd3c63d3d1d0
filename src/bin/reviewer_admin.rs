//! Reviewer Administration CLI
//!
//! Runs reviewer service operations directly against the database, e.g. to
//! offboard several people at once without going through the HTTP API.

use anyhow::Context;
use clap::{Parser, Subcommand};
use reviewer_service::assignment::RandomSource;
use reviewer_service::database::Database;
use reviewer_service::ReviewService;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "reviewer-admin")]
#[command(about = "Pull request reviewer administration tool")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database URL
    #[arg(long, default_value = "sqlite://reviewer-service.db")]
    database_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show review assignment counts per reviewer
    Stats {
        /// Only show the count for this user
        #[arg(long)]
        user: Option<String>,
    },

    /// List pull requests a user is reviewing
    Reviews {
        /// User ID
        user_id: String,
    },

    /// Show a team and its members
    Team {
        /// Team name
        team_name: String,
    },

    /// Activate or deactivate a single user
    SetActive {
        /// User ID
        user_id: String,

        /// New active flag
        #[arg(action = clap::ArgAction::Set)]
        is_active: bool,
    },

    /// Merge a pull request
    Merge {
        /// Pull request ID
        pull_request_id: String,
    },

    /// Replace one reviewer on an open pull request
    Reassign {
        /// Pull request ID
        pull_request_id: String,

        /// Reviewer to replace
        old_reviewer_id: String,
    },

    /// Deactivate team members and hand their open reviews to teammates
    BulkDeactivate {
        /// Team name
        #[arg(short, long)]
        team: String,

        /// Users to deactivate
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let database = Database::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;
    database.run_migrations().await?;

    let service = ReviewService::new(database.clone(), RandomSource::Entropy);

    match cli.command {
        Commands::Stats { user } => {
            let stats = service.get_assignment_stats().await?;
            match user {
                Some(user_id) => print_json(&serde_json::json!({
                    "user_id": user_id,
                    "assignments": stats.for_user(&user_id),
                }))?,
                None => print_json(&serde_json::json!({
                    "reviewers": stats.reviewers,
                    "total": stats.total(),
                }))?,
            }
        }

        Commands::Reviews { user_id } => print_json(&service.get_user_reviews(&user_id).await?)?,

        Commands::Team { team_name } => print_json(&service.get_team(&team_name).await?)?,

        Commands::SetActive { user_id, is_active } => {
            print_json(&service.set_user_active(&user_id, is_active).await?)?
        }

        Commands::Merge { pull_request_id } => {
            print_json(&service.merge_pull_request(&pull_request_id).await?)?
        }

        Commands::Reassign {
            pull_request_id,
            old_reviewer_id,
        } => print_json(
            &service
                .reassign_reviewer(&pull_request_id, &old_reviewer_id)
                .await?,
        )?,

        Commands::BulkDeactivate { team, user_ids } => {
            let result = service
                .bulk_deactivate_team_users(&team, &user_ids)
                .await
                .with_context(|| format!("bulk deactivation in team {} rolled back", team))?;
            print_json(&result)?
        }
    }

    database.close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
