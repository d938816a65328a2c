//! Dashboard landing page handler.

use axum::{extract::State, response::Json, Extension};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Overview, SessionUser};
use crate::errors::AppResult;

/// Signed-in user and overview data
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub user: SessionUser,
    pub overview: Overview,
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards and latest invoices", body = DashboardResponse),
        (status = 303, description = "Not signed in")
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<DashboardResponse>> {
    let overview = state.invoice_service.overview().await?;
    Ok(Json(DashboardResponse { user, overview }))
}
