//! Invoice Dashboard - backend for an invoice and customer admin dashboard
//!
//! Form actions (create/update/delete invoice, sign in) validate submitted
//! forms, write to Postgres and revalidate cached pages in Redis. The
//! dashboard read models are served as JSON behind a session cookie.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, form parsing and read models
//! - **services**: Form actions and read model use cases
//! - **infra**: Database, repositories and the Redis page cache
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Form state and pagination
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Insert placeholder data
//! cargo run -- seed
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Invoice, InvoiceStatus, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
