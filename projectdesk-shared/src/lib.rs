//! # ProjectDesk Shared Library
//!
//! Domain logic behind the ProjectDesk API: projects, tasks, users and
//! their competencies, shaped and scoped per caller.
//!
//! ## Module Organization
//!
//! - `auth`: session tokens, password hashing and the role guard
//! - `db`: connection pool and migrations
//! - `models`: database rows and write DTOs
//! - `query`: field projection, ordering, search and visibility filters
//! - `services`: entity services used by the HTTP handlers
//! - `notify`: outbound mail
//! - `export`: CSV rendering and object storage uploads

pub mod auth;
pub mod db;
pub mod export;
pub mod models;
pub mod notify;
pub mod query;
pub mod services;

/// Current version of the ProjectDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
