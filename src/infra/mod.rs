//! Infrastructure layer - External systems integration
//!
//! - Postgres connection, migrations and seed data
//! - Repositories over the `users`, `customers` and `invoices` tables
//! - Redis page cache used for revalidation and rate limiting

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use repositories::{
    CustomerRepository, CustomerStore, InvoiceRepository, InvoiceStore, InvoiceTotals,
    UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(test)]
pub use cache::MockCacheStore;
#[cfg(test)]
pub use unit_of_work::TestUnitOfWork;
