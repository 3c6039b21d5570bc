//! SQLite backend for the Seaway hierarchy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-step attribution writes run as
//! single rusqlite transactions on that thread, which also serialises
//! concurrent repairs on the same agent.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
