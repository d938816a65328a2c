//! Validated form extractor - Combines form decoding with validation.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::domain::FieldErrors;
use crate::types::{ActionOutcome, FormState};

/// `application/x-www-form-urlencoded` body that has passed its `validator`
/// rules.
///
/// Failures are answered with a 422 [`FormState`]: field messages keyed by
/// field name, and the first of them (by field name) as the form message.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use invoice_dashboard::api::extractors::ValidatedForm;
///
/// #[derive(Deserialize, Validate)]
/// struct SearchForm {
///     #[validate(length(min = 1, message = "Enter a search term."))]
///     query: String,
/// }
///
/// async fn search(ValidatedForm(form): ValidatedForm<SearchForm>) {
///     // form is already validated
/// }
/// ```
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = ActionOutcome;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ActionOutcome::Invalid(FormState::message(e.body_text())))?;

        value
            .validate()
            .map_err(|e| ActionOutcome::Invalid(form_state(&e)))?;

        Ok(ValidatedForm(value))
    }
}

/// Convert validator errors into form state
fn form_state(errors: &ValidationErrors) -> FormState {
    let mut fields = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        for e in errs {
            let message = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            fields.add(&field, message);
        }
    }

    let message = fields
        .first_message()
        .unwrap_or("Invalid form data.")
        .to_string();
    FormState::with_errors(fields, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Credentials {
        #[validate(length(min = 1, message = "Missing credentials."))]
        email: String,
        #[validate(length(min = 1, message = "Missing credentials."))]
        password: String,
    }

    #[test]
    fn test_form_state_collects_field_messages() {
        let form = Credentials {
            email: "user@nextmail.com".to_string(),
            password: String::new(),
        };
        let state = form_state(&form.validate().unwrap_err());

        assert_eq!(state.errors.get("password"), ["Missing credentials."]);
        assert!(!state.errors.contains("email"));
        assert_eq!(state.message.as_deref(), Some("Missing credentials."));
    }
}
