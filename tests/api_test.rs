//! Integration tests for API endpoints.
//!
//! These tests use mock services to drive the router without requiring
//! actual database or Redis connections.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use invoice_dashboard::api::{create_router, AppState};
use invoice_dashboard::config::{
    INVOICES_PATH, MSG_CREATE_MISSING_FIELDS, MSG_DELETE_DB_ERROR, MSG_MISSING_CREDENTIALS,
    MSG_UPDATE_MISSING_FIELDS,
};
use invoice_dashboard::domain::{
    CardData, CustomerOption, CustomerSummary, InvoiceForm, InvoicePage, Overview, SessionUser,
};
use invoice_dashboard::errors::{AppError, AppResult};
use invoice_dashboard::infra::{CacheStore, Database};
use invoice_dashboard::services::{
    AuthService, Claims, CustomerService, InvoiceEditView, InvoiceService, Services, SignedIn,
};
use invoice_dashboard::types::{ActionOutcome, FormState};

const SESSION: &str = "valid-session";
const FAILING_INVOICE: Uuid = Uuid::from_u128(0xdead_beef);

// =============================================================================
// Mock Services for Testing
// =============================================================================

/// Accepts password "123456", rejects "wrong-password", fails otherwise.
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        match password {
            "123456" => Ok(SignedIn {
                user: SessionUser {
                    id: Uuid::new_v4(),
                    name: "User".to_string(),
                    email: email.to_string(),
                },
                token: SESSION.to_string(),
                created: false,
            }),
            "wrong-password" => Err(AppError::InvalidCredentials),
            _ => Err(AppError::internal("connection refused")),
        }
    }

    fn verify_session(&self, token: &str) -> AppResult<Claims> {
        if token == SESSION {
            Ok(Claims {
                sub: Uuid::new_v4(),
                email: "user@nextmail.com".to_string(),
                name: "User".to_string(),
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 3600,
            })
        } else {
            Err(AppError::Session(
                jsonwebtoken::errors::ErrorKind::InvalidToken.into(),
            ))
        }
    }
}

/// Validates forms for real and counts writes.
#[derive(Default)]
struct MockInvoiceService {
    writes: AtomicUsize,
}

#[async_trait]
impl InvoiceService for MockInvoiceService {
    async fn create_invoice(&self, form: InvoiceForm) -> AppResult<ActionOutcome> {
        match form.parse_for_create() {
            Ok(_) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(ActionOutcome::redirect(INVOICES_PATH))
            }
            Err(errors) => Ok(ActionOutcome::Invalid(FormState::with_errors(
                errors,
                MSG_CREATE_MISSING_FIELDS,
            ))),
        }
    }

    async fn update_invoice(&self, _id: Uuid, form: InvoiceForm) -> AppResult<ActionOutcome> {
        match form.parse_for_update() {
            Ok(_) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(ActionOutcome::redirect(INVOICES_PATH))
            }
            Err(errors) => Ok(ActionOutcome::Invalid(FormState::with_errors(
                errors,
                MSG_UPDATE_MISSING_FIELDS,
            ))),
        }
    }

    async fn delete_invoice(&self, id: Uuid) -> AppResult<ActionOutcome> {
        if id == FAILING_INVOICE {
            return Err(AppError::action_failed(MSG_DELETE_DB_ERROR));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(ActionOutcome::redirect(INVOICES_PATH))
    }

    async fn list_invoices(&self, query: &str, page: u64) -> AppResult<InvoicePage> {
        Ok(InvoicePage {
            invoices: vec![],
            query: query.to_string(),
            page,
            total_pages: 0,
        })
    }

    async fn invoice_for_edit(&self, _id: Uuid) -> AppResult<InvoiceEditView> {
        Err(AppError::NotFound)
    }

    async fn overview(&self) -> AppResult<Overview> {
        Ok(Overview {
            cards: CardData {
                number_of_invoices: 13,
                number_of_customers: 6,
                total_paid_invoices: "$1,234.56".to_string(),
                total_pending_invoices: "$5.00".to_string(),
            },
            latest_invoices: vec![],
        })
    }
}

struct MockCustomerService;

#[async_trait]
impl CustomerService for MockCustomerService {
    async fn search_customers(&self, _query: &str) -> AppResult<Vec<CustomerSummary>> {
        Ok(vec![])
    }

    async fn customer_options(&self) -> AppResult<Vec<CustomerOption>> {
        Ok(vec![])
    }
}

/// Rate limiter that always allows, or fails when `down` is set.
#[derive(Default)]
struct MockCache {
    down: AtomicBool,
}

#[async_trait]
impl CacheStore for MockCache {
    async fn page_generation(&self, _path: &str) -> AppResult<u64> {
        Ok(0)
    }

    async fn get_page(&self, _path: &str, _generation: u64) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn put_page(&self, _path: &str, _generation: u64, _body: &str) -> AppResult<()> {
        Ok(())
    }

    async fn revalidate_path(&self, _path: &str) -> AppResult<u64> {
        Ok(0)
    }

    async fn check_rate_limit(
        &self,
        _identifier: &str,
        _max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        if self.down.load(Ordering::SeqCst) {
            Err(AppError::internal("redis unavailable"))
        } else {
            Ok((1, true))
        }
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    router: Router,
    invoices: Arc<MockInvoiceService>,
    cache: Arc<MockCache>,
}

fn app() -> TestApp {
    let invoices = Arc::new(MockInvoiceService::default());
    let cache = Arc::new(MockCache::default());
    let services = Services::new(
        Arc::new(MockAuthService),
        invoices.clone(),
        Arc::new(MockCustomerService),
    );
    let database = Arc::new(Database::from_connection(DatabaseConnection::default()));
    let state = AppState::new(&services, cache.clone(), database, false);

    TestApp {
        router: create_router(state),
        invoices,
        cache,
    }
}

fn get(uri: &str, session: bool) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if session {
        builder = builder.header(header::COOKIE, format!("dashboard_session={}", SESSION));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, session: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if session {
        builder = builder.header(header::COOKIE, format!("dashboard_session={}", SESSION));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_dashboard_requires_session() {
    let app = app();

    let response = send(&app.router, get("/dashboard/invoices?page=2", false)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/login?callbackUrl=%2Fdashboard%2Finvoices%3Fpage%3D2"
    );
}

#[tokio::test]
async fn test_forged_session_is_redirected() {
    let app = app();
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "dashboard_session=forged")
        .body(Body::empty())
        .unwrap();

    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?callbackUrl=%2Fdashboard");
}

#[tokio::test]
async fn test_dashboard_overview_with_session() {
    let app = app();

    let response = send(&app.router, get("/dashboard", true)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], "user@nextmail.com");
    assert_eq!(body["overview"]["cards"]["number_of_invoices"], 13);
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            "/login",
            "email=user%40nextmail.com&password=123456&redirectTo=%2Fdashboard%2Finvoices",
            false,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/invoices");
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("dashboard_session=valid-session"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_login_ignores_external_redirect() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            "/login",
            "email=user%40nextmail.com&password=123456&redirectTo=https%3A%2F%2Fevil.example",
            false,
        ),
    )
    .await;

    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app();

    let response = send(
        &app.router,
        post_form("/login", "email=user%40nextmail.com&password=wrong-password", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn test_login_missing_password() {
    let app = app();

    let response = send(
        &app.router,
        post_form("/login", "email=user%40nextmail.com&password=", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["message"], MSG_MISSING_CREDENTIALS);
    assert_eq!(body["errors"]["password"][0], "Missing credentials.");
}

#[tokio::test]
async fn test_login_missing_password_with_odd_email() {
    let app = app();

    let response = send(&app.router, post_form("/login", "email=admin&password=", false)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["message"], MSG_MISSING_CREDENTIALS);
    assert!(body["errors"].get("email").is_none());
}

#[tokio::test]
async fn test_login_missing_email() {
    let app = app();

    let response = send(&app.router, post_form("/login", "password=123456", false)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["message"], MSG_MISSING_CREDENTIALS);
    assert_eq!(body["errors"]["email"][0], MSG_MISSING_CREDENTIALS);
}

#[tokio::test]
async fn test_login_accepts_any_email_shape() {
    let app = app();

    let response = send(&app.router, post_form("/login", "email=admin&password=123456", false)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert!(set_cookie(&response).starts_with("dashboard_session="));
}

#[tokio::test]
async fn test_login_unexpected_failure_is_generic() {
    let app = app();

    let response = send(
        &app.router,
        post_form("/login", "email=user%40nextmail.com&password=anything", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Authentication error.");
}

#[tokio::test]
async fn test_login_rate_limit_fails_closed() {
    let app = app();
    app.cache.down.store(true, Ordering::SeqCst);

    let response = send(
        &app.router,
        post_form("/login", "email=user%40nextmail.com&password=123456", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_login_page() {
    let app = app();

    let response = send(&app.router, get("/login?callbackUrl=%2Fdashboard%2Fcustomers", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["redirectTo"], "/dashboard/customers");

    let response = send(&app.router, get("/login", true)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = app();

    let response = send(&app.router, post_form("/logout", "", true)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("dashboard_session="));
    assert!(cookie.contains("Max-Age=0"));
}

// =============================================================================
// Invoice actions
// =============================================================================

#[tokio::test]
async fn test_create_invoice_invalid_form() {
    let app = app();

    let response = send(
        &app.router,
        post_form("/dashboard/invoices", "customerId=&amount=-5&status=", true),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.invoices.writes.load(Ordering::SeqCst), 0);

    let body = json_body(response).await;
    assert_eq!(body["message"], MSG_CREATE_MISSING_FIELDS);
    assert_eq!(body["errors"]["customerId"][0], "Please select a customer.");
    assert_eq!(
        body["errors"]["amount"][0],
        "Please enter an amount greater than $0."
    );
    assert_eq!(body["errors"]["status"][0], "Please select an invoice status.");
}

#[tokio::test]
async fn test_create_invoice_redirects() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            "/dashboard/invoices",
            "customerId=3958dc9e-712f-4377-85e9-fec4b6a6442a&amount=157.95&status=paid",
            true,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);
    assert_eq!(app.invoices.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_invoice_requires_session() {
    let app = app();

    let response = send(
        &app.router,
        post_form("/dashboard/invoices", "amount=10", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.invoices.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_update_unknown_invoice_redirects() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            &format!("/dashboard/invoices/{}/edit", Uuid::new_v4()),
            "customerId=3958dc9e-712f-4377-85e9-fec4b6a6442a&amount=1&status=paid",
            true,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);
}

#[tokio::test]
async fn test_delete_invoice_failure_is_server_error() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            &format!("/dashboard/invoices/{}/delete", FAILING_INVOICE),
            "",
            true,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], MSG_DELETE_DB_ERROR);
}

#[tokio::test]
async fn test_delete_invoice_redirects() {
    let app = app();

    let response = send(
        &app.router,
        post_form(
            &format!("/dashboard/invoices/{}/delete", Uuid::new_v4()),
            "",
            true,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), INVOICES_PATH);
}

#[tokio::test]
async fn test_list_invoices_parses_search() {
    let app = app();

    let response = send(&app.router, get("/dashboard/invoices?query=lee&page=3", true)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["query"], "lee");
    assert_eq!(body["page"], 3);
}
