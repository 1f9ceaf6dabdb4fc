//! Error type for `roster-migrate`.
//!
//! Store errors cross the trait boundary through the stores' associated
//! `Error` types and are boxed here; every variant is fatal to the run.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source store error: {0}")]
  Source(#[source] BoxError),

  #[error("document store error: {0}")]
  Documents(#[source] BoxError),

  #[error("child fetch worker failed: {0}")]
  FetchWorker(#[from] tokio::task::JoinError),
}

impl Error {
  pub(crate) fn source<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Source(Box::new(e))
  }

  pub(crate) fn documents<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Documents(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
