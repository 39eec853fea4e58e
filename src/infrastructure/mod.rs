//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Bearer token verification (auth)
//! - Repository implementations (repositories)
//! - Live collection snapshots (live)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod live;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
