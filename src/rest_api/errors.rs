//! # REST API Errors
//!
//! Error types for the REST API module. Every error renders as
//! `{code, message, data: {status}}`.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::platform::{PlatformError, Viewer};

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request parameter failed sanitization or validation
    #[error("Invalid parameter(s): {param}")]
    InvalidParam { param: String, reason: String },

    /// No product with the requested id
    #[error("Invalid ID.")]
    InvalidProductId,

    /// Viewer lacks the capability the route requires
    #[error("{message}")]
    CannotView {
        message: &'static str,
        logged_in: bool,
    },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Session did not yield a cart
    #[error("Unable to retrieve cart.")]
    CartUnavailable,

    /// Host collaborator failed
    #[error("{0}")]
    Upstream(#[from] PlatformError),

    /// Internal error while rendering a response
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        RestError::InvalidParam {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn cannot_view(viewer: &Viewer, message: &'static str) -> Self {
        RestError::CannotView {
            message,
            logged_in: viewer.is_logged_in(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RestError::InvalidParam { .. } => "rest_invalid_param",
            RestError::InvalidProductId => "woocommerce_rest_product_invalid_id",
            RestError::CannotView { .. } => "woocommerce_rest_cannot_view",
            RestError::CartUnavailable => "woocommerce_rest_cart_error",
            RestError::Upstream(_) => "woocommerce_rest_upstream_error",
            RestError::Internal(_) => "woocommerce_rest_internal_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            RestError::InvalidProductId => StatusCode::NOT_FOUND,

            // Anonymous callers are asked to authenticate; known users are refused
            RestError::CannotView { logged_in, .. } => {
                if *logged_in {
                    StatusCode::FORBIDDEN
                } else {
                    StatusCode::UNAUTHORIZED
                }
            }

            RestError::CartUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    pub data: ErrorData,
}

#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl From<&RestError> for ErrorResponse {
    fn from(err: &RestError) -> Self {
        let params = match err {
            RestError::InvalidParam { param, reason } => {
                Some(BTreeMap::from([(param.clone(), reason.clone())]))
            }
            _ => None,
        };
        Self {
            code: err.code(),
            message: err.to_string(),
            data: ErrorData {
                status: err.status_code().as_u16(),
                params,
            },
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
