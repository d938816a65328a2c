//! Service Container - Centralized service access.
//!
//! Builds every service over one [`Persistence`] unit of work and hands them
//! out as trait objects.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CustomerDirectory, CustomerService, InvoiceManager,
    InvoiceService,
};
use crate::config::Config;
use crate::infra::{CacheStore, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn invoices(&self) -> Arc<dyn InvoiceService>;

    fn customers(&self) -> Arc<dyn CustomerService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    invoice_service: Arc<dyn InvoiceService>,
    customer_service: Arc<dyn CustomerService>,
}

impl Services {
    /// Create a service container from already built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        invoice_service: Arc<dyn InvoiceService>,
        customer_service: Arc<dyn CustomerService>,
    ) -> Self {
        Self {
            auth_service,
            invoice_service,
            customer_service,
        }
    }

    /// Create service container from database connection, cache and config
    pub fn from_connection(
        db: Arc<sea_orm::DatabaseConnection>,
        cache: Arc<dyn CacheStore>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            invoice_service: Arc::new(InvoiceManager::new(uow.clone(), cache)),
            customer_service: Arc::new(CustomerDirectory::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn invoices(&self) -> Arc<dyn InvoiceService> {
        self.invoice_service.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerService> {
        self.customer_service.clone()
    }
}
