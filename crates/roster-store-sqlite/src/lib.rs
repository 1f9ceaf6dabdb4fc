//! SQLite backends for the roster stores.
//!
//! Two independent databases: the relational employee source and the JSON
//! document collection. Both wrap [`tokio_rusqlite`] so all database access
//! runs on a dedicated thread without blocking the async runtime.

mod documents;
mod encode;
mod schema;
mod source;

pub mod error;

pub use documents::SqliteDocuments;
pub use error::{Error, Result};
pub use source::SqliteSource;
