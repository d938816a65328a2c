//! Customer domain entity and read models.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Customer domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Entry of the customer select box on invoice forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerOption {
    pub id: Uuid,
    pub name: String,
}

impl From<Customer> for CustomerOption {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
        }
    }
}

/// Customer with aggregated invoice totals, as shown on the customers table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    /// Formatted currency
    #[schema(example = "$1,234.56")]
    pub total_pending: String,
    /// Formatted currency
    #[schema(example = "$1,234.56")]
    pub total_paid: String,
}
