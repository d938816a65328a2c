//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for exploring the form actions and read models.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, customer_handler, dashboard_handler, invoice_handler};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{
    CardData, CustomerOption, CustomerSummary, InvoiceForm, InvoiceFormValues, InvoiceListItem,
    InvoicePage, InvoiceStatus, LatestInvoice, Overview, SessionUser,
};
use crate::services::InvoiceEditView;
use crate::types::FormState;

/// OpenAPI documentation for the invoice dashboard
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Invoice Dashboard",
        version = "0.1.0",
        description = "Invoice and customer administration: form actions, session sign-in and dashboard read models"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login_page,
        auth_handler::login,
        auth_handler::logout,
        dashboard_handler::overview,
        invoice_handler::list_invoices,
        invoice_handler::new_invoice,
        invoice_handler::create_invoice,
        invoice_handler::edit_invoice,
        invoice_handler::update_invoice,
        invoice_handler::delete_invoice,
        customer_handler::list_customers,
    ),
    components(
        schemas(
            InvoiceStatus,
            InvoiceForm,
            InvoiceListItem,
            InvoicePage,
            InvoiceFormValues,
            InvoiceEditView,
            LatestInvoice,
            CardData,
            Overview,
            CustomerOption,
            CustomerSummary,
            SessionUser,
            FormState,
            auth_handler::LoginForm,
            auth_handler::LoginPage,
            dashboard_handler::DashboardResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in, auto-registration and sign-out"),
        (name = "Dashboard", description = "Overview cards"),
        (name = "Invoices", description = "Invoice form actions and table"),
        (name = "Customers", description = "Customers table")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
        }
    }
}
