//! Form action responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::FieldErrors;

/// State handed back to a form after a rejected submission.
///
/// Serializes as `{ "errors": { "amount": ["..."] }, "message": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormState {
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }

    pub fn with_errors(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors,
            message: Some(message.into()),
        }
    }
}

/// Result of a form action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Success: `303 See Other` to the given path
    Redirect(String),
    /// Field validation failed (422)
    Invalid(FormState),
    /// Credentials rejected (401)
    Denied(FormState),
    /// The write itself failed (500)
    Failed(FormState),
}

impl ActionOutcome {
    pub fn redirect(path: impl Into<String>) -> Self {
        ActionOutcome::Redirect(path.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ActionOutcome::Redirect(_) => StatusCode::SEE_OTHER,
            ActionOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionOutcome::Denied(_) => StatusCode::UNAUTHORIZED,
            ActionOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, ActionOutcome::Redirect(_))
    }
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ActionOutcome::Redirect(path) => Redirect::to(&path).into_response(),
            ActionOutcome::Invalid(state)
            | ActionOutcome::Denied(state)
            | ActionOutcome::Failed(state) => (status, Json(state)).into_response(),
        }
    }
}
