//! Run configuration: TOML file layered under `ROSTER_*` environment
//! variables; CLI flags are applied last by the caller.

use std::path::PathBuf;

use anyhow::Context as _;
use serde::Deserialize;

/// Configuration after file and environment layering. Every field stays
/// optional here so CLI flags can fill the gaps; `main` resolves what each
/// subcommand actually requires.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfig {
  /// Path to the relational source database.
  pub source_db:     Option<PathBuf>,
  /// Path to the document collection database.
  pub documents_db:  Option<PathBuf>,
  /// Master rows per extraction page.
  pub batch_size:    Option<u64>,
  /// Concurrent child fetches within a batch.
  pub fetch_workers: Option<usize>,
}

impl RunConfig {
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise RunConfig")
  }
}
