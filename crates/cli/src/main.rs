//! ProShop CLI - Database migrations and admin bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! proshop-cli migrate
//!
//! # Create admin user
//! proshop-cli admin create -e admin@example.com -n "Admin Name" -p 'correct horse'
//!
//! # Promote an existing user
//! proshop-cli admin promote -e jane@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proshop-cli")]
#[command(author, version, about = "ProShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant the admin flag to an existing user
    Promote {
        /// Email of the account to promote
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
                password,
            } => commands::admin::create_user(&email, &name, &password).await?,
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
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
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "proshop-cli",
            "admin",
            "create",
            "-e",
            "admin@example.com",
            "-n",
            "Admin",
            "-p",
            "pw",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Create { ref email, .. }
            } if email == "admin@example.com"
        ));
    }
}
