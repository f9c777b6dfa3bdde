//! Mercato CLI - Database migrations and data checks.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations for the engine named by MERCATO_DATABASE_URL
//! mercato-cli migrate
//!
//! # Normalize an email address the way the API stores it
//! mercato-cli check-email Ada@Example.COM
//!
//! # Normalize a phone number to E.164
//! mercato-cli check-phone "+1 415-555-2671"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `check-email` - Validate and normalize an email address
//! - `check-phone` - Validate and normalize a phone number

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mercato-cli")]
#[command(author, version, about = "Mercato CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Validate an email address and print its stored form
    CheckEmail {
        /// Email address to check
        address: String,
    },
    /// Validate a phone number and print its E.164 form
    CheckPhone {
        /// Phone number to check, with country code
        number: String,
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
        Commands::CheckEmail { address } => {
            commands::check::print(&commands::check::email(&address)?);
        }
        Commands::CheckPhone { number } => {
            commands::check::print(&commands::check::phone(&number)?);
        }
    }
    Ok(())
}
