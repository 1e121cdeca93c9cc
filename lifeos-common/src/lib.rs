//! # LifeOS Common Library
//!
//! Shared code for the LifeOS API service:
//! - Error and result types
//! - Bootstrap configuration loading
//! - Database initialization, schema and migrations
//! - Calendar helpers (week start, month arithmetic, lenient date parsing)

pub mod config;
pub mod dates;
pub mod db;
pub mod error;

pub use error::{Error, Result};
