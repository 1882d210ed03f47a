//! Hearthside CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hearthside migrate
//!
//! # Seed the catalog from a YAML fixture
//! hearthside seed -f crates/cli/fixtures/catalog.yaml
//!
//! # Grant the admin flag to an existing user
//! hearthside admin grant -e maya@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hearthside")]
#[command(author, version, about = "Hearthside CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML fixture
    Seed {
        /// Path to the YAML fixture file
        #[arg(short, long, default_value = "crates/cli/fixtures/catalog.yaml")]
        file: String,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin flag to an existing user
    Grant {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin flag from a user
    Revoke {
        /// User email address
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
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::set_flag(&email, true).await?,
            AdminAction::Revoke { email } => commands::admin::set_flag(&email, false).await?,
        },
    }
    Ok(())
}
