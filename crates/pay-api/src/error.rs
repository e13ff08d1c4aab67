//! # API Errors
//!
//! Every failure leaving a handler goes through [`ApiError`], which renders
//! the JSON error body and status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pay_core::PaymentError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message shown instead of internal details in production
pub const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// What went wrong
#[derive(Debug, Error)]
pub enum ApiErrorKind {
    /// Domain or processor failure
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Request body is not valid JSON for the endpoint
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// Request body exceeds the buffering limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// No route for this method and path
    #[error("Route not found: {method} {path}")]
    NotFound { method: String, path: String },

    /// A handler panicked
    #[error("Handler panicked")]
    Panic,
}

/// Error returned by handlers
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ApiError {
    kind: ApiErrorKind,
    expose_details: bool,
}

/// JSON error body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind) -> Self {
        Self {
            kind,
            expose_details: false,
        }
    }

    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound {
            method: method.into(),
            path: path.into(),
        })
    }

    /// Whether internal error messages are rendered as-is
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        let code = match &self.kind {
            ApiErrorKind::Payment(e) => e.status_code(),
            ApiErrorKind::InvalidJson(_) => 400,
            ApiErrorKind::PayloadTooLarge => 413,
            ApiErrorKind::NotFound { .. } => 404,
            ApiErrorKind::Panic => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn code(&self) -> &'static str {
        match &self.kind {
            ApiErrorKind::Payment(e) => e.code(),
            ApiErrorKind::InvalidJson(_) => "invalid_json",
            ApiErrorKind::PayloadTooLarge => "payload_too_large",
            ApiErrorKind::NotFound { .. } => "not_found",
            ApiErrorKind::Panic => "internal_error",
        }
    }

    fn is_internal(&self) -> bool {
        match &self.kind {
            ApiErrorKind::Payment(e) => e.is_internal(),
            ApiErrorKind::Panic => true,
            _ => false,
        }
    }

    /// Build the response body
    pub fn body(&self) -> ErrorBody {
        let message = if self.is_internal() && !self.expose_details {
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            self.kind.to_string()
        };

        let mut body = ErrorBody {
            error: self.code(),
            message,
            status: self.status_code().as_u16(),
            missing_fields: None,
            field: None,
            decline_code: None,
            method: None,
            path: None,
        };

        match &self.kind {
            ApiErrorKind::Payment(PaymentError::MissingFields(fields)) => {
                body.missing_fields = Some(fields.clone());
            }
            ApiErrorKind::Payment(PaymentError::Card { decline_code, .. }) => {
                body.decline_code = decline_code.clone();
            }
            ApiErrorKind::Payment(e) if e.is_validation() => {
                body.field = e.fields().first().map(|f| f.to_string());
            }
            ApiErrorKind::NotFound { method, path } => {
                body.method = Some(method.clone());
                body.path = Some(path.clone());
            }
            _ => {}
        }

        body
    }
}

impl From<ApiErrorKind> for ApiError {
    fn from(kind: ApiErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::new(ApiErrorKind::Payment(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), "{}", self.kind);
        }
        (status, Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
