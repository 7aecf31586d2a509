use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::utils::*;
use crate::cli::{open_store, OutputFormat};
use crate::database::{CredentialStore, StoreError};
use crate::models::{RecordId, UserRecord};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a sign-in account")]
    Add {
        #[arg(long, help = "Login email (unique)")]
        email: String,

        #[arg(long, help = "Display name")]
        name: String,

        #[arg(long, help = "Plain-text password, hashed before storage")]
        password: String,
    },

    #[command(about = "List sign-in accounts")]
    List,

    #[command(about = "Print an Argon2id hash for a password")]
    HashPassword {
        #[arg(long)]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { email, name, password } => {
            let email = email.trim().to_string();
            if email.is_empty() || password.is_empty() {
                anyhow::bail!("Email and password must not be empty");
            }

            let password_hash = hash_password(&password).context("Failed to hash password")?;
            let user = UserRecord {
                id: RecordId::generate().to_string(),
                email,
                name,
                password_hash,
            };
            let identity = user.identity();

            let store = open_store();
            match store.insert_user(user).await {
                Ok(()) => {}
                Err(StoreError::UniqueViolation) => {
                    anyhow::bail!("User '{}' already exists", identity.email)
                }
                Err(e) => return Err(e).context("Failed to create user"),
            }
            store.manager().close().await;

            output_success(
                &output_format,
                &format!("Created user {} ({})", identity.email, identity.id),
                Some(json!({ "user": identity })),
            )
        }
        UserCommands::List => {
            let store = open_store();
            let users = store.list_users().await.context("Failed to list users")?;
            store.manager().close().await;

            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users");
            }

            let identities: Vec<_> = users.iter().map(UserRecord::identity).collect();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": identities }))?);
                }
                OutputFormat::Text => {
                    println!("{:<26} {:<32} {}", "ID", "EMAIL", "NAME");
                    println!("{}", "-".repeat(80));
                    for user in &identities {
                        println!("{:<26} {:<32} {}", user.id, user.email, user.name);
                    }
                }
            }
            Ok(())
        }
        UserCommands::HashPassword { password } => {
            let hash = hash_password(&password).context("Failed to hash password")?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "hash": hash }))?),
                OutputFormat::Text => println!("{hash}"),
            }
            Ok(())
        }
    }
}
