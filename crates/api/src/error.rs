//! Error translation with Sentry integration.
//!
//! Every failure on a request path is a [`WriteError`]. [`ApiError::translate`]
//! turns it into the client response, choosing the first matching category:
//!
//! | Category               | Status | Body                                              |
//! |------------------------|--------|---------------------------------------------------|
//! | no input               | 400    | `{error: "No input data provided."}`              |
//! | schema failure         | 400    | `{error: "Invalid format", messages: {...}}`      |
//! | field validator        | 400    | `{error: "Invalid Content", message}`             |
//! | NOT NULL constraint    | 400    | `{error: "Required field missing", field}`        |
//! | UNIQUE constraint      | 409    | `{error: "Email already exists", message}`        |
//! | other constraint       | 400    | `{error: "Database Integrity Error", message}`    |
//! | unknown id             | 404    | `{error: "Customer not found"}`                   |
//! | anything else          | 500    | `{error: "Internal server error"}`                |
//!
//! Server errors are captured to Sentry before responding; their details are
//! never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use mercato_core::FieldValidationError;

use crate::db::{ConstraintKind, ConstraintViolation, RepositoryError};
use crate::schemas::SchemaValidationError;

/// Everything that can go wrong while handling a request.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The request carried no usable payload.
    #[error("no input data provided")]
    NoInput,

    /// The payload failed structural validation.
    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaValidationError),

    /// A field failed its entity validator.
    #[error("field validation failed on {field}: {0}", field = .0.field)]
    Field(#[from] FieldValidationError),

    /// The store failed or rejected the operation.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ConstraintViolation> for WriteError {
    fn from(violation: ConstraintViolation) -> Self {
        Self::Repository(RepositoryError::Constraint(violation))
    }
}

/// Stable machine-readable error category, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoInput,
    InvalidFormat,
    InvalidContent,
    RequiredFieldMissing,
    Conflict,
    IntegrityError,
    NotFound,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoInput => "no_input",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidContent => "invalid_content",
            Self::RequiredFieldMissing => "required_field_missing",
            Self::Conflict => "conflict",
            Self::IntegrityError => "integrity_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// The resource a request operates on, for resource-specific messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Address,
    Customer,
}

impl Resource {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::Customer => "Customer",
        }
    }

    /// Headline for a unique-constraint conflict on `column`.
    #[must_use]
    pub fn duplicate_message(self, column: Option<&str>) -> String {
        match (self, column) {
            (Self::Customer, Some("email")) => "Email already exists".to_string(),
            (_, Some(column)) => format!("{} already exists", capitalize(column)),
            (resource, None) => format!("{} already exists", resource.name()),
        }
    }

    #[must_use]
    pub fn not_found_message(self) -> String {
        format!("{} not found", self.name())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// A translated error, ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    body: Value,
    /// Server-side cause, reported to Sentry and never returned.
    source: Option<RepositoryError>,
}

impl ApiError {
    /// Translate a request failure into its response.
    #[must_use]
    pub fn translate(resource: Resource, error: impl Into<WriteError>) -> Self {
        match error.into() {
            WriteError::NoInput => Self::client(
                StatusCode::BAD_REQUEST,
                ErrorCode::NoInput,
                json!({ "error": "No input data provided." }),
            ),
            WriteError::Schema(err) => Self::client(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidFormat,
                json!({ "error": "Invalid format", "messages": err.errors }),
            ),
            WriteError::Field(err) => Self::client(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidContent,
                json!({ "error": "Invalid Content", "message": err.reason }),
            ),
            WriteError::Repository(RepositoryError::Constraint(violation)) => {
                Self::constraint(resource, violation)
            }
            WriteError::Repository(RepositoryError::NotFound) => Self::not_found(resource),
            WriteError::Repository(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: ErrorCode::Internal,
                body: json!({ "error": "Internal server error" }),
                source: Some(err),
            },
        }
    }

    /// `404` for an id that names no stored entity.
    #[must_use]
    pub fn not_found(resource: Resource) -> Self {
        Self::client(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            json!({ "error": resource.not_found_message() }),
        )
    }

    fn constraint(resource: Resource, violation: ConstraintViolation) -> Self {
        match violation.kind {
            ConstraintKind::NotNull => Self::client(
                StatusCode::BAD_REQUEST,
                ErrorCode::RequiredFieldMissing,
                json!({ "error": "Required field missing", "field": violation.column }),
            ),
            ConstraintKind::Unique => Self::client(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                json!({
                    "error": resource.duplicate_message(violation.column.as_deref()),
                    "message": violation.detail,
                }),
            ),
            ConstraintKind::Other => Self::client(
                StatusCode::BAD_REQUEST,
                ErrorCode::IntegrityError,
                json!({ "error": "Database Integrity Error", "message": violation.detail }),
            ),
        }
    }

    const fn client(status: StatusCode, code: ErrorCode, body: Value) -> Self {
        Self {
            status,
            code,
            body,
            source: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(source) = &self.source {
            let event_id = sentry::capture_error(source);
            tracing::error!(
                error = %source,
                code = self.code.as_str(),
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(
                code = self.code.as_str(),
                status = self.status.as_u16(),
                "Request rejected"
            );
        }

        (self.status, Json(self.body)).into_response()
    }
}
