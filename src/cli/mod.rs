//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Migrate and start the HTTP server
//! - `migrate` - Database migrations
//! - `seed` - Placeholder data

pub mod args;

pub use args::{Cli, Commands};
