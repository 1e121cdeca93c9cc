//! Persisted records and their JSON representation
//!
//! Records serialize with camelCase keys, the id as `_id` and the owning user as
//! `user`. Nested collections are stored as JSON columns.

pub mod agenda;
pub mod cuisine;
pub mod finance;
pub mod life;
pub mod user;

pub use agenda::*;
pub use cuisine::*;
pub use finance::*;
pub use life::*;
pub use user::*;

/// Fresh record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
