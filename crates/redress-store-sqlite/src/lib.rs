//! SQLite backend for the Redress complaint store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every mutating operation is
//! a single transaction: the entity change and its audit record commit
//! together or not at all, and expected-status guards are re-checked
//! inside the transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
