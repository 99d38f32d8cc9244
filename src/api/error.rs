use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::fmt;

use super::{AVAILABLE_ROUTES, ErrorBody};
use crate::models::inquiry::{InquiryDraft, RequiredField};
use crate::services::InquiryError;

pub const VALIDATION_MESSAGE: &str = "Please provide name, email, and message.";
pub const MALFORMED_BODY_MESSAGE: &str = "Invalid request body.";
pub const PERSISTENCE_MESSAGE: &str = "Server error. Please try again later.";
pub const NOT_FOUND_MESSAGE: &str = "Route not found";
pub const INTERNAL_MESSAGE: &str = "Internal server error.";

/// Every failure the HTTP boundary can report.
///
/// Detail fields are `Some` only when the running environment allows
/// exposing them; the decision is made where the error is built.
#[derive(Debug)]
pub enum ApiError {
    Validation {
        missing: Vec<RequiredField>,
        received: Option<serde_json::Value>,
    },

    MalformedBody {
        status: StatusCode,
        detail: Option<String>,
    },

    Persistence {
        detail: Option<String>,
    },

    RouteNotFound {
        path: String,
    },

    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { missing, .. } => {
                let fields: Vec<&str> = missing.iter().map(|m| m.as_str()).collect();
                write!(f, "Validation error: missing {}", fields.join(", "))
            }
            Self::MalformedBody { status, .. } => write!(f, "Malformed body ({status})"),
            Self::Persistence { detail } => write!(
                f,
                "Persistence error: {}",
                detail.as_deref().unwrap_or("<hidden>")
            ),
            Self::RouteNotFound { path } => write!(f, "Route not found: {path}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation { missing, received } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    missing_fields: Some(missing.iter().map(|m| m.as_str()).collect()),
                    received,
                    ..ErrorBody::new(VALIDATION_MESSAGE)
                },
            ),
            Self::MalformedBody { status, detail } => (
                status,
                ErrorBody {
                    error: detail,
                    ..ErrorBody::new(MALFORMED_BODY_MESSAGE)
                },
            ),
            Self::Persistence { detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: detail,
                    ..ErrorBody::new(PERSISTENCE_MESSAGE)
                },
            ),
            Self::RouteNotFound { path } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    requested_path: Some(path),
                    available_routes: Some(AVAILABLE_ROUTES.to_vec()),
                    ..ErrorBody::new(NOT_FOUND_MESSAGE)
                },
            ),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(INTERNAL_MESSAGE),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Maps a service failure. `verbose` controls whether the received
    /// payload and the underlying failure are echoed back.
    #[must_use]
    pub fn from_inquiry_error(err: InquiryError, draft: &InquiryDraft, verbose: bool) -> Self {
        match err {
            InquiryError::Validation(err) => Self::Validation {
                missing: err.missing,
                received: verbose.then(|| serde_json::to_value(draft).ok()).flatten(),
            },
            InquiryError::Persistence(detail) => Self::Persistence {
                detail: verbose.then_some(detail),
            },
        }
    }

    #[must_use]
    pub fn malformed_body(rejection: &JsonRejection, verbose: bool) -> Self {
        let status = match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };

        Self::MalformedBody {
            status,
            detail: verbose.then(|| rejection.body_text()),
        }
    }

    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Catch-all for panics raised while handling a request.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}
