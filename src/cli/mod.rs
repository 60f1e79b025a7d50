pub mod commands;
pub mod utils;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::manager::DatabaseManager;

#[derive(Parser)]
#[command(name = "market")]
#[command(about = "Repair market operator CLI - schema and account administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create any missing tables, types and indexes")]
    Migrate,

    #[command(about = "Drop every table and recreate the schema (destroys all data)")]
    Reset {
        #[arg(long, help = "Confirm that all data may be destroyed")]
        yes: bool,
    },

    #[command(about = "Change the role of an existing account")]
    SetRole {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "New role, see `market roles`")]
        role: String,
    },

    #[command(about = "List the role values accounts can hold")]
    Roles,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::database::migrate(&connect(config).await?, output_format).await,
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to reset without --yes");
            }
            commands::database::reset(&connect(config).await?, output_format).await
        }
        Commands::SetRole { email, role } => {
            commands::users::set_role(&connect(config).await?, &email, &role, output_format).await
        }
        Commands::Roles => commands::users::roles(output_format),
    }
}

/// Operator commands act on the real database, never the in-memory store.
async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    if config.uses_memory_store() {
        bail!("DATABASE_URL must point at PostgreSQL for this command");
    }
    DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")
}
