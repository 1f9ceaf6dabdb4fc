//! `roster` — migrate relational employee records into the document
//! collection, then query the result.
//!
//! # Usage
//!
//! ```
//! roster migrate --config config.toml
//! roster query by-manager 110022
//! roster query avg-salary
//! ```
//!
//! Connection targets come from `config.toml`, `ROSTER_*` environment
//! variables, or flags — flags win.

mod config;
mod queries;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_migrate::MigrationSettings;
use roster_store_sqlite::{SqliteDocuments, SqliteSource};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use config::RunConfig;
use queries::QueryCommand;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "roster", about = "Employee records migration and query tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Relational source database path (overrides config and environment).
  #[arg(long)]
  source_db: Option<PathBuf>,

  /// Document collection path (overrides config and environment).
  #[arg(long)]
  documents_db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run the full migration to completion.
  Migrate {
    /// Master rows per extraction page.
    #[arg(long)]
    batch_size: Option<u64>,

    /// Concurrent child fetches within a batch.
    #[arg(long)]
    fetch_workers: Option<usize>,
  },

  /// Query the migrated document collection.
  #[command(subcommand)]
  Query(QueryCommand),
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = RunConfig::load(cli.config.clone())?;

  let documents_db = cli
    .documents_db
    .or(cfg.documents_db)
    .context("document collection path not set (config file, ROSTER_DOCUMENTS_DB, or --documents-db)")?;

  match cli.command {
    Command::Migrate {
      batch_size,
      fetch_workers,
    } => {
      let source_db = cli
        .source_db
        .or(cfg.source_db)
        .context("source database path not set (config file, ROSTER_SOURCE_DB, or --source-db)")?;

      let defaults = MigrationSettings::default();
      let settings = MigrationSettings {
        batch_size:    batch_size.or(cfg.batch_size).unwrap_or(defaults.batch_size),
        fetch_workers: fetch_workers
          .or(cfg.fetch_workers)
          .unwrap_or(defaults.fetch_workers),
      };

      // Both connections are opened once and held for the whole run.
      let source = SqliteSource::open(&source_db)
        .await
        .with_context(|| format!("failed to open source database at {source_db:?}"))?;
      let documents = SqliteDocuments::open(&documents_db)
        .await
        .with_context(|| format!("failed to open document collection at {documents_db:?}"))?;

      let report = roster_migrate::run(&source, &documents, &settings)
        .await
        .context("migration failed")?;

      tracing::info!(
        "data migration completed successfully: {} employees in {} batches, \
         {} departments backfilled",
        report.employees,
        report.batches,
        report.departments_backfilled,
      );
      Ok(())
    }

    Command::Query(query) => {
      let documents = SqliteDocuments::open(&documents_db)
        .await
        .with_context(|| format!("failed to open document collection at {documents_db:?}"))?;
      queries::execute(&documents, query).await
    }
  }
}
