//! Shared building blocks for the MySQL HTTP API.
//!
//! - [`config`]: environment-driven configuration
//! - [`errors`]: error taxonomy and its HTTP mapping
//! - [`middleware`]: request context (request IDs, access logging)
//! - [`models`]: wire models and MySQL row rendering

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
