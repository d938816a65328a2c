//! Customer repository.

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, QueryOrder,
    Statement,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::customer::{self, Entity as CustomerEntity};
use super::like_pattern;
use crate::domain::{format_currency, Customer, CustomerSummary};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Customer repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// All customers ordered by name
    async fn list(&self) -> AppResult<Vec<Customer>>;

    /// Customers whose name or email contain `query`, with invoice totals
    async fn search(&self, query: &str) -> AppResult<Vec<CustomerSummary>>;

    async fn count(&self) -> AppResult<u64>;
}

/// SeaORM-backed customer repository
pub struct CustomerStore {
    db: Arc<DatabaseConnection>,
}

impl CustomerStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: Uuid,
    name: String,
    email: String,
    image_url: String,
    total_invoices: i64,
    total_pending: i64,
    total_paid: i64,
}

impl From<SummaryRow> for CustomerSummary {
    fn from(row: SummaryRow) -> Self {
        CustomerSummary {
            id: row.id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            total_invoices: row.total_invoices,
            total_pending: format_currency(row.total_pending),
            total_paid: format_currency(row.total_paid),
        }
    }
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn list(&self) -> AppResult<Vec<Customer>> {
        let models = CustomerEntity::find()
            .order_by_asc(customer::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Customer::from).collect())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CustomerSummary>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT customers.id, customers.name, customers.email, customers.image_url, \
                    COUNT(invoices.id) AS total_invoices, \
                    COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END), 0)::bigint AS total_pending, \
                    COALESCE(SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END), 0)::bigint AS total_paid \
             FROM customers \
             LEFT JOIN invoices ON customers.id = invoices.customer_id \
             WHERE customers.name ILIKE $1 OR customers.email ILIKE $1 \
             GROUP BY customers.id, customers.name, customers.email, customers.image_url \
             ORDER BY customers.name ASC",
            [like_pattern(query).into()],
        );

        let rows = SummaryRow::find_by_statement(stmt).all(self.db.as_ref()).await?;
        Ok(rows.into_iter().map(CustomerSummary::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(CustomerEntity::find().count(self.db.as_ref()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formats_totals() {
        let summary = CustomerSummary::from(SummaryRow {
            id: Uuid::new_v4(),
            name: "Delba de Oliveira".to_string(),
            email: "delba@oliveira.com".to_string(),
            image_url: "/customers/delba-de-oliveira.png".to_string(),
            total_invoices: 3,
            total_pending: 44800,
            total_paid: 123456,
        });

        assert_eq!(summary.total_invoices, 3);
        assert_eq!(summary.total_pending, "$448.00");
        assert_eq!(summary.total_paid, "$1,234.56");
    }
}
