use crate::engine::EngineError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vibe_api::{ErrorBody, FieldErrorSnapshot};
use vibe_domain::{EntityKind, FieldError, StoreError};

/// What a route calls itself in error bodies: the 500 message and the 400
/// message for rejected payloads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Endpoint {
    pub(crate) failure: &'static str,
    pub(crate) invalid: &'static str,
}

impl Endpoint {
    pub(crate) const fn read(failure: &'static str) -> Self {
        Self {
            failure,
            invalid: "Invalid request",
        }
    }

    pub(crate) const fn write(failure: &'static str, invalid: &'static str) -> Self {
        Self { failure, invalid }
    }

    pub(crate) fn reject(self, err: EngineError) -> ApiError {
        let err = match err {
            EngineError::Store(err) => return self.store(err),
            other => other,
        };
        tracing::error!(error = %err, endpoint = self.failure, "engine call failed");
        ApiError::Unexpected(self.failure)
    }

    pub(crate) fn store(self, err: StoreError) -> ApiError {
        match &err {
            StoreError::NotFound { entity, .. } | StoreError::MissingParent { entity, .. } => {
                ApiError::NotFound(*entity)
            }
            StoreError::DuplicateEmail(_) | StoreError::RanksExhausted { .. } => {
                ApiError::Conflict {
                    message: err.to_string(),
                    errors: err.field_errors(),
                }
            }
            StoreError::DanglingReference { .. } | StoreError::Invalid(_) => ApiError::Invalid {
                message: self.invalid,
                errors: err.field_errors(),
            },
        }
    }

    pub(crate) fn invalid(self, errors: Vec<FieldError>) -> ApiError {
        ApiError::Invalid {
            message: self.invalid,
            errors,
        }
    }

    pub(crate) fn malformed(self, rejection: JsonRejection) -> ApiError {
        ApiError::Invalid {
            message: self.invalid,
            errors: vec![FieldError::payload(rejection.body_text())],
        }
    }
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Invalid {
        message: &'static str,
        errors: Vec<FieldError>,
    },
    NotFound(EntityKind),
    Conflict {
        message: String,
        errors: Vec<FieldError>,
    },
    Unexpected(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Invalid { message, errors } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: message.to_owned(),
                    errors: errors.into_iter().map(field_error_snapshot).collect(),
                },
            ),
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                ErrorBody::message(format!("{entity} not found")),
            ),
            ApiError::Conflict { message, errors } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    message,
                    errors: errors.into_iter().map(field_error_snapshot).collect(),
                },
            ),
            ApiError::Unexpected(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::message(message),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn field_error_snapshot(error: FieldError) -> FieldErrorSnapshot {
    FieldErrorSnapshot {
        path: error.path,
        message: error.message,
    }
}
