//! Pulp Shop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pulp-cli migrate
//!
//! # Load seed users and orders into the database
//! pulp-cli seed --dir crates/server/data
//!
//! # Generate a TOTP secret, or the current code for one
//! pulp-cli totp secret
//! pulp-cli totp code IFTXE3SPOEYVURT2MRYGI52TKJ4HC3KH
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pulp-cli")]
#[command(author, version, about = "Pulp Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with users and orders from YAML
    Seed {
        /// Directory containing users.yml and orders.yml
        #[arg(short, long, default_value = "crates/server/data")]
        dir: PathBuf,
    },
    /// TOTP helpers
    Totp {
        #[command(subcommand)]
        action: TotpAction,
    },
}

#[derive(Subcommand)]
enum TotpAction {
    /// Print a new random base32 secret
    Secret,
    /// Print the current code for a secret
    Code {
        /// Base32 secret
        secret: String,
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
        Commands::Seed { dir } => commands::seed::run(&dir).await?,
        Commands::Totp { action } => match action {
            TotpAction::Secret => commands::totp::secret(),
            TotpAction::Code { secret } => commands::totp::code(&secret)?,
        },
    }
    Ok(())
}
