//! Project configuration
//!
//! Storage backend selection, database pool settings and the server address.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
