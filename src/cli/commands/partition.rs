use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{open_store, OutputFormat};
use crate::database::Partition;

#[derive(Subcommand)]
pub enum PartitionCommands {
    #[command(about = "Create a user's partition schema and tables ahead of first sign-in")]
    Init {
        #[arg(long, help = "24-hex user id")]
        user_id: String,
    },
}

pub async fn handle(cmd: PartitionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PartitionCommands::Init { user_id } => {
            let partition = Partition::for_user_id(&user_id)?;

            let store = open_store();
            store
                .ensure_partition(&partition)
                .await
                .with_context(|| format!("Failed to provision {partition}"))?;
            store.manager().close().await;

            output_success(
                &output_format,
                &format!("Partition {partition} is ready"),
                Some(json!({ "partition": partition.name() })),
            )
        }
    }
}
