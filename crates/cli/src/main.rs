//! Cirrus CLI - database migrations and the reminder sweep.
//!
//! ```bash
//! cargo run -p cirrus-cli -- migrate   # apply storefront migrations
//! cargo run -p cirrus-cli -- remind    # send subscription expiry reminders
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cirrus", about = "Cirrus management tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Send subscription expiry reminders for orders expiring soon.
    Remind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Migrate => commands::migrate::run().await?,
        Command::Remind => commands::remind::run().await?,
    }

    Ok(())
}
