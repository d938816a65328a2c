//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill the
//! dashboard's form actions and read models. They reach the database only
//! through the Unit of Work and the cache only through [`CacheStore`].
//!
//! [`CacheStore`]: crate::infra::CacheStore

mod auth_service;
pub mod container;
mod customer_service;
mod invoice_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, SignedIn};
pub use customer_service::{CustomerDirectory, CustomerService};
pub use invoice_service::{InvoiceEditView, InvoiceManager, InvoiceService};
