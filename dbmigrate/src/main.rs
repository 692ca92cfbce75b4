//! Database lifecycle tool for migration workflows.
//!
//! Exposes the four adapter operations as subcommands. The orchestration of
//! a migration run (which operation happens when) belongs to the caller;
//! this binary performs exactly one operation per invocation.
//!
//! # Security Guarantees
//! - Credentials reach native tooling via environment variables only
//! - Connection URLs are redacted before logging

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dbmigrate_core::{Result, create_adapter, init_logging, redact_database_url};
use tracing::info;

/// Command-line interface for the database lifecycle tool
#[derive(Parser)]
#[command(name = "dbmigrate")]
#[command(about = "Database lifecycle operations for migration workflows")]
#[command(version)]
struct Cli {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Database connection string (credentials are never logged)"
    )]
    database_url: String,

    /// Schema dump file path
    #[arg(
        long,
        default_value = "db/structure.sql",
        help = "File the structure dump is written to and loaded from"
    )]
    schema_file: PathBuf,

    /// Migrations bookkeeping table
    #[arg(
        long,
        default_value = "schema_migrations",
        help = "Table tracking applied migrations; dumped separately from the structure"
    )]
    migrations_table: String,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Operation to perform
    #[command(subcommand)]
    command: Command,
}

/// Available lifecycle operations
#[derive(Subcommand)]
enum Command {
    /// Create the configured database
    Create,
    /// Drop the configured database
    Drop,
    /// Dump the database structure and migration bookkeeping rows
    Dump,
    /// Load a previously dumped structure into the database
    Load,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // The subscriber may not be installed if logging setup itself
        // failed, so report on stderr directly.
        eprintln!("dbmigrate: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet)?;

    let adapter = create_adapter(&cli.database_url, cli.schema_file, cli.migrations_table)?;

    info!(
        engine = %adapter.database_type(),
        target = %redact_database_url(&cli.database_url),
        "connected configuration"
    );

    match cli.command {
        Command::Create => adapter.create_database().await?,
        Command::Drop => adapter.drop_database().await?,
        Command::Dump => adapter.dump_schema().await?,
        Command::Load => adapter.load_schema().await?,
    }

    info!("done");
    Ok(())
}
