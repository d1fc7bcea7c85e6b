use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::{ValidationError, ValidationErrors};

use crate::domain::aggregates::{DiscountError, OrderError, ProductError};
use crate::PricingError;

pub const SOMETHING_WENT_WRONG: &str = "Something went wrong, please try again later!";

/// Field name to messages, rendered as the `details` of a 400 response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_error(&mut self, field: impl Into<String>, error: &ValidationError) {
        let message = error.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| error.code.to_string());
        self.add(field, message);
    }

    /// Copies `validator` field errors, prefixing each field name.
    pub fn merge(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            for e in errs {
                self.add_error(format!("{prefix}{field}"), e);
            }
        }
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() { Ok(()) } else { Err(ApiError::Validation(self)) }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        fields.merge("", &errors);
        fields
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors.0)),
            ApiError::Malformed(msg) => (StatusCode::BAD_REQUEST, json!({ "non_field_errors": [msg] })),
            ApiError::Pricing(
                err @ (PricingError::NegativeAmount(_) | PricingError::NegativePercentage(_) | PricingError::InvalidQuantity),
            ) => (StatusCode::BAD_REQUEST, json!({ "non_field_errors": [err.to_string()] })),
            ApiError::Pricing(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::Value::Null)
            }
        };

        let body = Json(json!({
            "error": SOMETHING_WENT_WRONG,
            "details": details,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self { Self::Validation(errors.into()) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::Malformed(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::Malformed(rejection.body_text()) }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self { Self::field("name", err.to_string()) }
}

impl From<DiscountError> for ApiError {
    fn from(err: DiscountError) -> Self { Self::field("name", err.to_string()) }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self { Self::field("products", err.to_string()) }
}
