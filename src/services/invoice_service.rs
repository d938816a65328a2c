//! Invoice actions and dashboard read models.
//!
//! Writes validate the submitted form, run one statement and revalidate the
//! invoices page. Reads of the invoices table go through the page cache.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    INVOICES_PATH, INVOICES_PER_PAGE, LATEST_INVOICES_LIMIT, MSG_CREATE_DB_ERROR,
    MSG_CREATE_MISSING_FIELDS, MSG_DELETE_DB_ERROR, MSG_UPDATE_DB_ERROR,
    MSG_UPDATE_MISSING_FIELDS,
};
use crate::domain::{
    format_currency, CardData, CustomerOption, InvoiceForm, InvoiceFormValues, InvoicePage,
    Overview,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, UnitOfWork};
use crate::types::{page_offset, total_pages, ActionOutcome, FormState};

/// Data behind the edit invoice form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceEditView {
    pub invoice: InvoiceFormValues,
    pub customers: Vec<CustomerOption>,
}

/// Invoice service trait for dependency injection.
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Validate and insert a new invoice dated today (UTC).
    async fn create_invoice(&self, form: InvoiceForm) -> AppResult<ActionOutcome>;

    /// Validate and overwrite an invoice. An unknown id updates nothing and
    /// still redirects.
    async fn update_invoice(&self, id: Uuid, form: InvoiceForm) -> AppResult<ActionOutcome>;

    /// Delete an invoice. Database failures are returned as errors rather
    /// than form state.
    async fn delete_invoice(&self, id: Uuid) -> AppResult<ActionOutcome>;

    /// One page of the invoices table filtered by `query`.
    async fn list_invoices(&self, query: &str, page: u64) -> AppResult<InvoicePage>;

    async fn invoice_for_edit(&self, id: Uuid) -> AppResult<InvoiceEditView>;

    /// Card data and latest invoices of the dashboard landing page.
    async fn overview(&self) -> AppResult<Overview>;
}

/// Concrete implementation of InvoiceService using Unit of Work.
pub struct InvoiceManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<U: UnitOfWork> InvoiceManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }

    /// Drop cached renderings of the invoices table. The write has already
    /// committed, so a cache failure is only logged.
    async fn revalidate_invoices(&self) {
        if let Err(e) = self.cache.revalidate_path(INVOICES_PATH).await {
            tracing::warn!(error = %e, path = INVOICES_PATH, "Failed to revalidate path");
        }
    }
}

/// Cache key path of one invoices page, e.g. `/dashboard/invoices?query=lee&page=2`.
fn invoices_page_path(query: &str, page: u64) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("query", query)
        .append_pair("page", &page.to_string())
        .finish();
    format!("{}?{}", INVOICES_PATH, params)
}

#[async_trait]
impl<U: UnitOfWork> InvoiceService for InvoiceManager<U> {
    async fn create_invoice(&self, form: InvoiceForm) -> AppResult<ActionOutcome> {
        let draft = match form.parse_for_create() {
            Ok(draft) => draft,
            Err(errors) => {
                return Ok(ActionOutcome::Invalid(FormState::with_errors(
                    errors,
                    MSG_CREATE_MISSING_FIELDS,
                )))
            }
        };

        let date = Utc::now().date_naive();
        match self.uow.invoices().create(draft, date).await {
            Ok(invoice) => {
                tracing::info!(invoice_id = %invoice.id, amount = invoice.amount, "Invoice created");
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to create invoice");
                return Ok(ActionOutcome::Failed(FormState::message(MSG_CREATE_DB_ERROR)));
            }
        }

        self.revalidate_invoices().await;
        Ok(ActionOutcome::redirect(INVOICES_PATH))
    }

    async fn update_invoice(&self, id: Uuid, form: InvoiceForm) -> AppResult<ActionOutcome> {
        let draft = match form.parse_for_update() {
            Ok(draft) => draft,
            Err(errors) => {
                return Ok(ActionOutcome::Invalid(FormState::with_errors(
                    errors,
                    MSG_UPDATE_MISSING_FIELDS,
                )))
            }
        };

        match self.uow.invoices().update(id, draft).await {
            Ok(()) => tracing::info!(invoice_id = %id, "Invoice updated"),
            Err(e) => {
                tracing::error!(invoice_id = %id, error = ?e, "Failed to update invoice");
                return Ok(ActionOutcome::Failed(FormState::message(MSG_UPDATE_DB_ERROR)));
            }
        }

        self.revalidate_invoices().await;
        Ok(ActionOutcome::redirect(INVOICES_PATH))
    }

    async fn delete_invoice(&self, id: Uuid) -> AppResult<ActionOutcome> {
        match self.uow.invoices().delete(id).await {
            Ok(()) => tracing::info!(invoice_id = %id, "Invoice deleted"),
            Err(e) => {
                tracing::error!(invoice_id = %id, error = ?e, "Failed to delete invoice");
                return Err(AppError::action_failed(MSG_DELETE_DB_ERROR));
            }
        }

        self.revalidate_invoices().await;
        Ok(ActionOutcome::redirect(INVOICES_PATH))
    }

    async fn list_invoices(&self, query: &str, page: u64) -> AppResult<InvoicePage> {
        let path = invoices_page_path(query, page);

        // Read before the database so a concurrent revalidation moves later
        // reads past whatever this render stores.
        let generation = match self.cache.page_generation(INVOICES_PATH).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Page cache unavailable");
                None
            }
        };

        if let Some(generation) = generation {
            match self.cache.get_page(&path, generation).await {
                Ok(Some(body)) => match serde_json::from_str::<InvoicePage>(&body) {
                    Ok(cached) => return Ok(cached),
                    Err(e) => tracing::warn!(path = %path, error = %e, "Discarding unreadable cached page"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(path = %path, error = %e, "Page cache unavailable"),
            }
        }

        let invoices = self.uow.invoices();
        let (rows, total) = tokio::try_join!(
            invoices.search(query, INVOICES_PER_PAGE, page_offset(page, INVOICES_PER_PAGE)),
            invoices.count_matching(query),
        )?;

        let result = InvoicePage {
            invoices: rows,
            query: query.to_string(),
            page,
            total_pages: total_pages(total, INVOICES_PER_PAGE),
        };

        if let Some(generation) = generation {
            match serde_json::to_string(&result) {
                Ok(body) => {
                    if let Err(e) = self.cache.put_page(&path, generation, &body).await {
                        tracing::warn!(path = %path, error = %e, "Failed to cache page");
                    }
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "Failed to serialize page"),
            }
        }

        Ok(result)
    }

    async fn invoice_for_edit(&self, id: Uuid) -> AppResult<InvoiceEditView> {
        let invoices = self.uow.invoices();
        let customers = self.uow.customers();
        let (invoice, customers) =
            tokio::try_join!(invoices.find_by_id(id), customers.list())?;
        let invoice = invoice.ok_or_not_found()?;

        Ok(InvoiceEditView {
            invoice: invoice.into(),
            customers: customers.into_iter().map(CustomerOption::from).collect(),
        })
    }

    async fn overview(&self) -> AppResult<Overview> {
        let invoices = self.uow.invoices();
        let customers = self.uow.customers();
        let (totals, number_of_customers, latest_invoices) = tokio::try_join!(
            invoices.totals(),
            customers.count(),
            invoices.latest(LATEST_INVOICES_LIMIT),
        )?;

        Ok(Overview {
            cards: CardData {
                number_of_invoices: totals.count,
                number_of_customers: i64::try_from(number_of_customers).unwrap_or(i64::MAX),
                total_paid_invoices: format_currency(totals.paid),
                total_pending_invoices: format_currency(totals.pending),
            },
            latest_invoices,
        })
    }
}
