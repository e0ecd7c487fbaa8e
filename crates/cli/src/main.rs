//! CafeGo CLI - database and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! cafego migrate
//!
//! # Insert default users and products into an empty database
//! cafego seed
//!
//! # Create a user
//! cafego user add -u thanatos -p hypnos
//!
//! # Print a user's order history
//! cafego orders zagreus
//!
//! # Delete expired sessions
//! cafego prune-sessions
//! ```
//!
//! All commands read the same environment as the storefront
//! (`CAFEGO_DATABASE_URL`, `.env` supported).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cafego")]
#[command(author, version, about = "CafeGo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed default users and products into empty tables
    Seed,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Print a user's order history
    Orders {
        /// Username whose orders to print
        username: String,
    },
    /// Delete expired sessions
    PruneSessions,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Add {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (stored as an Argon2 hash)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

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
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Add { username, password } => {
                commands::users::add(&username, &password).await?;
            }
        },
        Commands::Orders { username } => commands::orders::print(&username).await?,
        Commands::PruneSessions => commands::sessions::prune().await?,
    }
    Ok(())
}
