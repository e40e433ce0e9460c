//! Database module for the execution engine
//!
//! Provides database connectivity, row models, repositories, and error
//! handling. Workflow definition tables are read-only here; execution
//! record tables are owned by the engine.

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{DatabaseConnection, DatabasePool, MIGRATOR};
pub use error::{DatabaseError, DbResult};
