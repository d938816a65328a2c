//! API layer - HTTP handlers and middleware
//!
//! - Form action and read model handlers
//! - Session and rate limit middleware
//! - The validated form extractor
//! - Route definitions and OpenAPI document

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
