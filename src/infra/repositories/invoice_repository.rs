//! Invoice repository.
//!
//! Writes go through the SeaORM entity; the joined read models use raw
//! parameterized statements.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, Set, Statement,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::invoice::{self, ActiveModel, Entity as InvoiceEntity};
use super::like_pattern;
use crate::domain::{format_currency, Invoice, InvoiceDraft, InvoiceListItem, InvoiceStatus, LatestInvoice};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Aggregates over the invoices table, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub count: i64,
    pub paid: i64,
    pub pending: i64,
}

/// Invoice repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert one invoice dated `date`
    async fn create(&self, draft: InvoiceDraft, date: NaiveDate) -> AppResult<Invoice>;

    /// Overwrite customer, amount and status (and date when the draft has
    /// one). An id that matches no row is not an error.
    async fn update(&self, id: Uuid, draft: InvoiceDraft) -> AppResult<()>;

    /// Delete by id. An id that matches no row is not an error.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>>;

    /// Invoices whose customer name/email, amount, date or status contain
    /// `query`, newest first
    async fn search(&self, query: &str, limit: u64, offset: u64) -> AppResult<Vec<InvoiceListItem>>;

    /// Number of invoices `search` would return without paging
    async fn count_matching(&self, query: &str) -> AppResult<u64>;

    async fn latest(&self, limit: u64) -> AppResult<Vec<LatestInvoice>>;

    async fn totals(&self) -> AppResult<InvoiceTotals>;
}

/// SeaORM-backed invoice repository
pub struct InvoiceStore {
    db: Arc<DatabaseConnection>,
}

impl InvoiceStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const SEARCH_FILTER: &str = "customers.name ILIKE $1 \
     OR customers.email ILIKE $1 \
     OR invoices.amount::text ILIKE $1 \
     OR invoices.date::text ILIKE $1 \
     OR invoices.status ILIKE $1";

/// `LIMIT`/`OFFSET` bind value; Postgres takes a signed `BIGINT`.
fn sql_int(value: u64) -> AppResult<i64> {
    i64::try_from(value).map_err(|_| AppError::internal(format!("{} does not fit a BIGINT", value)))
}

#[derive(Debug, FromQueryResult)]
struct InvoiceRow {
    id: Uuid,
    customer_id: Uuid,
    name: String,
    email: String,
    image_url: String,
    date: NaiveDate,
    amount: i32,
    status: String,
}

impl TryFrom<InvoiceRow> for InvoiceListItem {
    type Error = AppError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&row.status).ok_or_else(|| {
            AppError::internal(format!("invoice {} has unknown status {:?}", row.id, row.status))
        })?;

        Ok(InvoiceListItem {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            date: row.date,
            amount: row.amount,
            status,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct LatestRow {
    id: Uuid,
    name: String,
    email: String,
    image_url: String,
    amount: i32,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    count: i64,
    paid: i64,
    pending: i64,
}

#[async_trait]
impl InvoiceRepository for InvoiceStore {
    async fn create(&self, draft: InvoiceDraft, date: NaiveDate) -> AppResult<Invoice> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(draft.customer_id),
            amount: Set(draft.amount_cents),
            status: Set(draft.status.as_str().to_string()),
            date: Set(date),
        };

        let model = active_model.insert(self.db.as_ref()).await?;
        Invoice::try_from(model)
    }

    async fn update(&self, id: Uuid, draft: InvoiceDraft) -> AppResult<()> {
        let mut update = InvoiceEntity::update_many()
            .col_expr(invoice::Column::CustomerId, Expr::value(draft.customer_id))
            .col_expr(invoice::Column::Amount, Expr::value(draft.amount_cents))
            .col_expr(invoice::Column::Status, Expr::value(draft.status.as_str()));
        if let Some(date) = draft.date {
            update = update.col_expr(invoice::Column::Date, Expr::value(date));
        }

        let result = update
            .filter(invoice::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            tracing::debug!(invoice_id = %id, "Update matched no invoice");
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = InvoiceEntity::delete_by_id(id).exec(self.db.as_ref()).await?;

        if result.rows_affected == 0 {
            tracing::debug!(invoice_id = %id, "Delete matched no invoice");
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>> {
        InvoiceEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Invoice::try_from)
            .transpose()
    }

    async fn search(&self, query: &str, limit: u64, offset: u64) -> AppResult<Vec<InvoiceListItem>> {
        let sql = format!(
            "SELECT invoices.id, invoices.customer_id, customers.name, customers.email, \
                    customers.image_url, invoices.date, invoices.amount, invoices.status \
             FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {SEARCH_FILTER} \
             ORDER BY invoices.date DESC, invoices.id \
             LIMIT $2 OFFSET $3"
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                like_pattern(query).into(),
                sql_int(limit)?.into(),
                sql_int(offset)?.into(),
            ],
        );

        InvoiceRow::find_by_statement(stmt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(InvoiceListItem::try_from)
            .collect()
    }

    async fn count_matching(&self, query: &str) -> AppResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) AS count \
             FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {SEARCH_FILTER}"
        );
        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [like_pattern(query).into()]);

        let row = CountRow::find_by_statement(stmt).one(self.db.as_ref()).await?;
        Ok(row.and_then(|r| u64::try_from(r.count).ok()).unwrap_or(0))
    }

    async fn latest(&self, limit: u64) -> AppResult<Vec<LatestInvoice>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT invoices.id, customers.name, customers.email, customers.image_url, invoices.amount \
             FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             ORDER BY invoices.date DESC, invoices.id \
             LIMIT $1",
            [sql_int(limit)?.into()],
        );

        let rows = LatestRow::find_by_statement(stmt).all(self.db.as_ref()).await?;
        Ok(rows
            .into_iter()
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                amount: format_currency(i64::from(row.amount)),
            })
            .collect())
    }

    async fn totals(&self) -> AppResult<InvoiceTotals> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT COUNT(*) AS count, \
                    COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0)::bigint AS paid, \
                    COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::bigint AS pending \
             FROM invoices",
        );

        let row = TotalsRow::find_by_statement(stmt).one(self.db.as_ref()).await?;
        Ok(row
            .map(|r| InvoiceTotals {
                count: r.count,
                paid: r.paid,
                pending: r.pending,
            })
            .unwrap_or_default())
    }
}
