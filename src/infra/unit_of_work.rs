//! Unit of Work: one place that hands out every repository.
//!
//! Actions are single statements, so no transaction scope is exposed; the
//! database pool handles statement-level atomicity.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    CustomerRepository, CustomerStore, InvoiceRepository, InvoiceStore, UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn invoices(&self) -> Arc<dyn InvoiceRepository>;

    fn customers(&self) -> Arc<dyn CustomerRepository>;
}

/// Concrete implementation of UnitOfWork over one connection pool
pub struct Persistence {
    user_repo: Arc<UserStore>,
    invoice_repo: Arc<InvoiceStore>,
    customer_repo: Arc<CustomerStore>,
}

impl Persistence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(Arc::clone(&db))),
            invoice_repo: Arc::new(InvoiceStore::new(Arc::clone(&db))),
            customer_repo: Arc::new(CustomerStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn invoices(&self) -> Arc<dyn InvoiceRepository> {
        self.invoice_repo.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customer_repo.clone()
    }
}

/// Unit of Work over arbitrary repository implementations, used by tests to
/// inject mocks.
#[cfg(test)]
pub struct TestUnitOfWork {
    pub users: Arc<dyn UserRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub customers: Arc<dyn CustomerRepository>,
}

#[cfg(test)]
impl TestUnitOfWork {
    /// Unit of work whose repositories have no expectations: any call panics.
    pub fn empty() -> Self {
        use super::repositories::{
            MockCustomerRepository, MockInvoiceRepository, MockUserRepository,
        };

        Self {
            users: Arc::new(MockUserRepository::new()),
            invoices: Arc::new(MockInvoiceRepository::new()),
            customers: Arc::new(MockCustomerRepository::new()),
        }
    }
}

#[cfg(test)]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn invoices(&self) -> Arc<dyn InvoiceRepository> {
        self.invoices.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customers.clone()
    }
}
