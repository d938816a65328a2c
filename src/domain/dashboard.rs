//! Dashboard overview read model.

use serde::Serialize;
use utoipa::ToSchema;

use super::invoice::LatestInvoice;

/// Summary cards shown at the top of the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    /// Formatted currency
    #[schema(example = "$1,234.56")]
    pub total_paid_invoices: String,
    /// Formatted currency
    #[schema(example = "$1,234.56")]
    pub total_pending_invoices: String,
}

/// Everything the dashboard landing page shows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Overview {
    pub cards: CardData,
    pub latest_invoices: Vec<LatestInvoice>,
}
