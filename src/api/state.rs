//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, Database};
use crate::services::{AuthService, CustomerService, InvoiceService, ServiceContainer, Services};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub invoice_service: Arc<dyn InvoiceService>,
    pub customer_service: Arc<dyn CustomerService>,
    /// Page cache and rate limit counters
    pub cache: Arc<dyn CacheStore>,
    pub database: Arc<Database>,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    /// Create application state from database connection, cache and config.
    pub fn from_config(database: Arc<Database>, cache: Arc<dyn CacheStore>, config: Config) -> Self {
        let cookie_secure = config.cookie_secure;
        let container = Services::from_connection(database.shared_connection(), cache.clone(), config);

        Self {
            auth_service: container.auth(),
            invoice_service: container.invoices(),
            customer_service: container.customers(),
            cache,
            database,
            cookie_secure,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        services: &dyn ServiceContainer,
        cache: Arc<dyn CacheStore>,
        database: Arc<Database>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            invoice_service: services.invoices(),
            customer_service: services.customers(),
            cache,
            database,
            cookie_secure,
        }
    }
}
