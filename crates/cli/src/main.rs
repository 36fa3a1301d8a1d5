//! Leads Marketplace CLI - Database migrations and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lm-cli migrate
//!
//! # Mint a bearer token for an agency (debugging the mobile app)
//! lm-cli token issue --agency-id 3f6c... --email owner@acme.com
//!
//! # Apply a plan's territory limit (0 = unlimited)
//! lm-cli agency set-limit --agency-id 3f6c... --limit 10
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `token issue` - Issue a mobile bearer token
//! - `agency set-limit` - Set an agency's territory limit

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use leadmarket_core::{AgencyId, TerritoryLimit};

mod commands;

#[derive(Parser)]
#[command(name = "lm-cli")]
#[command(author, version, about = "Leads Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Manage agencies
    Agency {
        #[command(subcommand)]
        action: AgencyAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a mobile bearer token for an agency
    Issue {
        /// Agency UUID
        #[arg(short, long)]
        agency_id: AgencyId,

        /// Agency email address
        #[arg(short, long)]
        email: String,

        /// Token lifetime in days
        #[arg(long, default_value_t = 30)]
        ttl_days: u32,
    },
}

#[derive(Subcommand)]
enum AgencyAction {
    /// Set the maximum number of territories (0 = unlimited)
    SetLimit {
        /// Agency UUID
        #[arg(short, long)]
        agency_id: AgencyId,

        /// New territory limit
        #[arg(short, long)]
        limit: u32,
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
        Commands::Token { action } => match action {
            TokenAction::Issue {
                agency_id,
                email,
                ttl_days,
            } => commands::token::issue(agency_id, &email, ttl_days)?,
        },
        Commands::Agency { action } => match action {
            AgencyAction::SetLimit { agency_id, limit } => {
                commands::agency::set_limit(agency_id, TerritoryLimit::new(limit)).await?;
            }
        },
    }
    Ok(())
}
