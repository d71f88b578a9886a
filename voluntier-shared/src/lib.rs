//! # VolunTier Shared Library
//!
//! Persistence, authentication and the workflow operations of the VolunTier
//! volunteer-matching service. The HTTP layer lives in `voluntier-api`.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, sessions and ownership checks
//! - `storage`: Profile picture storage
//! - `services`: Workflow operations and their error taxonomy

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod storage;

/// Current version of the VolunTier shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
