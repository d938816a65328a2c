//! Session cookie middleware.

use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::api::AppState;
use crate::config::{LOGIN_PATH, SESSION_COOKIE_NAME};
use crate::domain::SessionUser;
use crate::services::Claims;

/// Signed-in user, inserted into request extensions by [`require_session`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub SessionUser);

/// Claims of a valid session cookie, if the request carries one.
pub fn session_claims(state: &AppState, jar: &CookieJar) -> Option<Claims> {
    let token = jar.get(SESSION_COOKIE_NAME)?;
    match state.auth_service.verify_session(token.value()) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session cookie");
            None
        }
    }
}

/// HttpOnly, SameSite=Lax cookie carrying a session token. It has no
/// `Max-Age`; the token's `exp` bounds the session.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removal cookie for the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

/// `/login?callbackUrl=<path>` for an interrupted request.
pub fn login_redirect_path(original: &str) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", original)
        .finish();
    format!("{}?{}", LOGIN_PATH, params)
}

/// Session middleware.
///
/// Verifies the session cookie and injects the [`CurrentUser`] into the
/// request extensions. Requests without a valid session are sent to the
/// login page with the original path as `callbackUrl`.
pub async fn require_session(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(claims) = session_claims(&state, &jar) else {
        let original = original_uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| original_uri.path());
        return Redirect::to(&login_redirect_path(original)).into_response();
    };

    request
        .extensions_mut()
        .insert(CurrentUser(SessionUser::from(claims)));

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_callback() {
        assert_eq!(
            login_redirect_path("/dashboard/invoices?page=2"),
            "/login?callbackUrl=%2Fdashboard%2Finvoices%3Fpage%3D2"
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_none());
    }
}
