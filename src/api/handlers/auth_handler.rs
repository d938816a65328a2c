//! Sign-in and sign-out handlers.

use axum::{
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedForm;
use crate::api::middleware::{
    expired_session_cookie, rate_limit_login, session_claims, session_cookie,
};
use crate::api::AppState;
use crate::config::{DASHBOARD_PATH, LOGIN_PATH, MSG_AUTH_ERROR, MSG_INVALID_CREDENTIALS};
use crate::errors::AppError;
use crate::types::{ActionOutcome, FormState};

/// Sign-in form. Both credentials are taken as submitted; an empty one is
/// the only rejection.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing credentials."))]
    #[schema(example = "user@nextmail.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing credentials."))]
    #[schema(example = "123456")]
    pub password: String,
    /// Local path to continue to after signing in
    #[schema(example = "/dashboard/invoices")]
    pub redirect_to: Option<String>,
}

/// `callbackUrl` of an interrupted dashboard request
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    pub callback_url: Option<String>,
}

/// What the login form should submit
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    #[schema(example = "/dashboard")]
    pub redirect_to: String,
}

/// Create authentication routes. Sign-in attempts are rate limited.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(login_page).merge(
                post(login).route_layer(middleware::from_fn_with_state(state, rate_limit_login)),
            ),
        )
        .route("/logout", post(logout))
}

/// Where to go after signing in: a local path, otherwise the dashboard.
pub fn safe_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}

/// Login page data
#[utoipa::path(
    get,
    path = "/login",
    tag = "Authentication",
    params(LoginQuery),
    responses(
        (status = 200, description = "Not signed in", body = LoginPage),
        (status = 303, description = "Already signed in, redirect to the dashboard")
    )
)]
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session_claims(&state, &jar).is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    Json(LoginPage {
        redirect_to: safe_redirect(query.callback_url.as_deref()),
    })
    .into_response()
}

/// Sign in, registering the account on first use
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in, session cookie set"),
        (status = 401, description = "Invalid email or password", body = FormState),
        (status = 422, description = "Missing credentials", body = FormState),
        (status = 429, description = "Too many attempts"),
        (status = 500, description = "Authentication error", body = FormState)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<(CookieJar, ActionOutcome), ActionOutcome> {
    let email = form.email.as_str();
    let redirect_to = safe_redirect(form.redirect_to.as_deref());

    match state.auth_service.authenticate(email, &form.password).await {
        Ok(signed_in) => {
            tracing::info!(user_id = %signed_in.user.id, created = signed_in.created, "Signed in");
            let cookie = session_cookie(signed_in.token, state.cookie_secure);
            Ok((jar.add(cookie), ActionOutcome::redirect(redirect_to)))
        }
        Err(AppError::InvalidCredentials) => Err(ActionOutcome::Denied(FormState::message(
            MSG_INVALID_CREDENTIALS,
        ))),
        Err(e) => {
            tracing::error!(email, error = ?e, "Sign-in failed");
            Err(ActionOutcome::Failed(FormState::message(MSG_AUTH_ERROR)))
        }
    }
}

/// Sign out
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses((status = 303, description = "Session cookie cleared, redirect to login"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(expired_session_cookie()), Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect_accepts_local_paths() {
        assert_eq!(safe_redirect(Some("/dashboard/invoices")), "/dashboard/invoices");
        assert_eq!(safe_redirect(Some("/dashboard?page=2")), "/dashboard?page=2");
    }

    #[test]
    fn test_safe_redirect_rejects_other_targets() {
        assert_eq!(safe_redirect(None), "/dashboard");
        assert_eq!(safe_redirect(Some("")), "/dashboard");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/dashboard");
        assert_eq!(safe_redirect(Some("//evil.example")), "/dashboard");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/dashboard");
    }

    #[test]
    fn test_login_form_requires_credentials() {
        let form = LoginForm {
            email: String::new(),
            password: String::new(),
            redirect_to: None,
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_login_form_takes_any_non_empty_credentials() {
        for (email, password) in [("admin", "1"), ("  ", "x"), ("user@nextmail.com", "123456")] {
            let form = LoginForm {
                email: email.to_string(),
                password: password.to_string(),
                redirect_to: None,
            };
            assert!(form.validate().is_ok(), "{email:?} / {password:?}");
        }
    }

    #[test]
    fn test_every_missing_credential_has_the_same_message() {
        let form = LoginForm {
            email: "admin".to_string(),
            password: String::new(),
            redirect_to: None,
        };
        let errors = form.validate().unwrap_err();
        let messages: Vec<_> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_deref().map(str::to_string))
            .collect();
        assert_eq!(messages, [crate::config::MSG_MISSING_CREDENTIALS]);
    }
}
