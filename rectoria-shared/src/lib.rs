//! # Rectoría Shared Library
//!
//! Core of the scheduling backend: the entity registry, the generic data
//! access layer and its storage backends, and the JWT authentication and
//! authorization middleware used by the API server.
//!
//! ## Module Organization
//!
//! - `models`: entity kinds, column definitions and value normalization
//! - `registry`: kind lookup and association wiring
//! - `store`: storage backends (in-memory and PostgreSQL)
//! - `data_access`: generic create/read/list/update/delete
//! - `db`: connection pool and schema synchronization
//! - `auth`: JWT handling and access middleware
//! - `error`: entity error taxonomy

pub mod auth;
pub mod data_access;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
