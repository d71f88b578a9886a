//! # VolunTier API Server Library
//!
//! HTTP surface of VolunTier: configuration, error mapping, middleware and
//! the route handlers over `voluntier-shared`'s workflow operations.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Identity resolution, login requirement, security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
