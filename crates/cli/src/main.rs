//! Resman CLI - Database migrations and account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! resman migrate
//!
//! # Create the first super admin
//! resman admin create -e root@example.com -n "Root" -r superAdmin --password ...
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin and super admin accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "resman")]
#[command(author, version, about = "Resman CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin or super admin
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account role (`superAdmin` or `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Login password
        #[arg(long, env = "RESMAN_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                let password = SecretString::from(password);
                commands::admin::create(&email, &name, &role, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_args() {
        let cli = Cli::try_parse_from([
            "resman", "admin", "create", "-e", "a@x.com", "-n", "A", "-r", "superAdmin",
            "--password", "pw",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Admin {
            action: AdminAction::Create { role, .. },
        } = cli.command
        else {
            panic!("expected admin create");
        };
        assert_eq!(role, "superAdmin");
    }
}
