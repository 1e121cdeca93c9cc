//! Database initialization and schema management

pub mod init;
pub mod migrations;

pub use init::*;
pub use migrations::run_migrations;
