//! Customers table handler.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::domain::CustomerSummary;
use crate::errors::AppResult;
use crate::types::SearchParams;

/// Create customer routes (nested under `/dashboard/customers`)
pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/", get(list_customers))
}

/// Customers with invoice totals, filtered by name or email
#[utoipa::path(
    get,
    path = "/dashboard/customers",
    tag = "Customers",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching customers", body = [CustomerSummary]),
        (status = 303, description = "Not signed in")
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<CustomerSummary>>> {
    Ok(Json(
        state.customer_service.search_customers(params.query()).await?,
    ))
}
