//! # NextUp Shared Library
//!
//! Shared types and business logic for the NextUp league signup API.
//!
//! ## Module Organization
//!
//! - `db`: PostgreSQL connection pool and migrations
//! - `models`: Database models (users, seasons, tryouts)
//! - `auth`: Password hashing, JWT tokens, request authentication
//! - `payments`: Checkout provider client and payment reconciliation

pub mod auth;
pub mod db;
pub mod models;
pub mod payments;

/// Current version of the NextUp shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
