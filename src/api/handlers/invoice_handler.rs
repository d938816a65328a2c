//! Invoice form actions and invoice table handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Form, Router,
};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CustomerOption, InvoiceForm, InvoicePage};
use crate::errors::AppResult;
use crate::services::InvoiceEditView;
use crate::types::{ActionOutcome, FormState, SearchParams};

/// Create invoice routes (nested under `/dashboard/invoices`)
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/create", get(new_invoice))
        .route("/:id/edit", get(edit_invoice).post(update_invoice))
        .route("/:id/delete", post(delete_invoice))
}

/// Invoices table
#[utoipa::path(
    get,
    path = "/dashboard/invoices",
    tag = "Invoices",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of invoices", body = InvoicePage),
        (status = 303, description = "Not signed in")
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<InvoicePage>> {
    let page = state
        .invoice_service
        .list_invoices(params.query(), params.page())
        .await?;
    Ok(Json(page))
}

/// Customers for the create invoice form
#[utoipa::path(
    get,
    path = "/dashboard/invoices/create",
    tag = "Invoices",
    responses((status = 200, description = "Customer options", body = [CustomerOption]))
)]
pub async fn new_invoice(State(state): State<AppState>) -> AppResult<Json<Vec<CustomerOption>>> {
    Ok(Json(state.customer_service.customer_options().await?))
}

/// Create an invoice dated today
#[utoipa::path(
    post,
    path = "/dashboard/invoices",
    tag = "Invoices",
    request_body(content = InvoiceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the invoices table"),
        (status = 422, description = "Missing fields", body = FormState),
        (status = 500, description = "Database error", body = FormState)
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<InvoiceForm>,
) -> AppResult<ActionOutcome> {
    tracing::debug!(user = %user.email, "Create invoice submitted");
    state.invoice_service.create_invoice(form).await
}

/// Invoice and customer options for the edit form
#[utoipa::path(
    get,
    path = "/dashboard/invoices/{id}/edit",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Edit form data", body = InvoiceEditView),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn edit_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InvoiceEditView>> {
    Ok(Json(state.invoice_service.invoice_for_edit(id).await?))
}

/// Update an invoice
#[utoipa::path(
    post,
    path = "/dashboard/invoices/{id}/edit",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body(content = InvoiceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated (or no such invoice), redirect to the invoices table"),
        (status = 422, description = "Missing fields", body = FormState),
        (status = 500, description = "Database error", body = FormState)
    )
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Form(form): Form<InvoiceForm>,
) -> AppResult<ActionOutcome> {
    tracing::debug!(user = %user.email, invoice_id = %id, "Update invoice submitted");
    state.invoice_service.update_invoice(id, form).await
}

/// Delete an invoice
#[utoipa::path(
    post,
    path = "/dashboard/invoices/{id}/delete",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 303, description = "Deleted (or no such invoice), redirect to the invoices table"),
        (status = 500, description = "Database error")
    )
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ActionOutcome> {
    tracing::debug!(user = %user.email, invoice_id = %id, "Delete invoice submitted");
    state.invoice_service.delete_invoice(id).await
}
