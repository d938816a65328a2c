//! Domain layer - entities, form parsing and read models.
//!
//! Nothing here touches the database or HTTP; repositories convert their
//! rows into these types and handlers serialize them.

pub mod customer;
pub mod dashboard;
pub mod invoice;
pub mod password;
pub mod user;
pub mod validation;

pub use customer::{Customer, CustomerOption, CustomerSummary};
pub use dashboard::{CardData, Overview};
pub use invoice::{
    format_currency, Invoice, InvoiceDraft, InvoiceForm, InvoiceFormValues, InvoiceListItem,
    InvoicePage, InvoiceStatus, LatestInvoice,
};
pub use password::Password;
pub use user::{SessionUser, User};
pub use validation::FieldErrors;
