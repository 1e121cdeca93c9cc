//! Authentication: session tokens, password hashing, TOTP second factor and the
//! request extractor that resolves the calling user

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod totp;

pub use extractor::{AuthUser, SESSION_COOKIE};
