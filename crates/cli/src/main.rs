//! Farmgate CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fg-cli migrate
//!
//! # Seed the catalog with demo products and a default admin account
//! fg-cli seed
//!
//! # Create an admin user
//! fg-cli admin create -u root -e admin@example.com -p 'a-strong-password'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed demo products and the default admin account
//! - `admin create` - Create admin users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fg-cli")]
#[command(author, version, about = "Farmgate CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed demo products and the default admin account
    Seed,
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
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                password,
            } => {
                commands::admin::create_user(&username, &email, &password).await?;
            }
        },
    }
    Ok(())
}
