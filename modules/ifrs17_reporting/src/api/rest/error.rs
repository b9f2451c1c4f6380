//! HTTP error mapping to RFC-9457 Problem Details

use super::dto::ParseErrorResponse;
use crate::contract::ReportingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Field-level validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            errors: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: ReportingError) -> Problem {
    let message = error.to_string();
    match error {
        ReportingError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", capitalize(resource)))
                .with_detail(format!("{} with id '{}' was not found", resource, id))
        }

        ReportingError::Validation(errors) => Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
            .with_detail(errors.to_string())
            .with_errors(errors.fields().clone()),

        ReportingError::UnsupportedFormat { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Unsupported File Format").with_detail(message)
        }

        ReportingError::Parse { .. } => Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Parse Error")
            .with_detail(message),

        ReportingError::InvalidCredentials => {
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail(message)
        }

        ReportingError::Internal => Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            .with_detail("An unexpected error occurred"),
    }
}

/// Error envelope of the file parse endpoint
pub struct ParseFailure(pub ReportingError);

impl IntoResponse for ParseFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReportingError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReportingError::Validation(_) | ReportingError::UnsupportedFormat { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match self.0 {
            ReportingError::Validation(errors) => errors
                .fields()
                .values()
                .flatten()
                .next()
                .cloned()
                .unwrap_or_else(|| "Invalid request".to_string()),
            other => other.to_string(),
        };
        (
            status,
            Json(ParseErrorResponse {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
