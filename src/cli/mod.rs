pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Finance tracker admin CLI - user and partition provisioning")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Manage sign-in accounts")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Provision per-user data partitions")]
    Partition {
        #[command(subcommand)]
        cmd: commands::partition::PartitionCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Store for commands that talk to the database. Connection happens lazily on
/// the first query.
pub fn open_store() -> PgStore {
    let manager = DatabaseManager::new(Arc::new(config().clone()));
    PgStore::new(Arc::new(manager))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Partition { cmd } => commands::partition::handle(cmd, output_format).await,
    }
}
