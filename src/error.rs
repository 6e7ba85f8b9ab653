//! Error handling for the settings facade.
//!
//! Follows RFC 7807 Problem Details for HTTP error bodies, with a
//! categorized error enum mapped to HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Error response body following RFC 7807 Problem Details.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,

    /// Request ID for tracing
    pub request_id: Option<String>,
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration validation failed: {message}")]
    ConfigValidation {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // Authentication and authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient permissions to manage site settings")]
    Forbidden,

    // Settings facade errors
    #[error("Unknown setting: {name}")]
    UnknownField { name: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // Storage errors
    #[error("Settings store failure: {operation} - {message}")]
    Store { operation: String, message: String },

    // System errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a new configuration validation error
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    /// Create a new store error
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigParse { .. } | Self::InvalidRequest { .. } | Self::Serialization { .. } => {
                StatusCode::BAD_REQUEST
            }

            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,

            Self::UnknownField { .. } | Self::ConfigNotFound { .. } => StatusCode::NOT_FOUND,

            Self::ConfigValidation { .. }
            | Self::Store { .. }
            | Self::Io { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type URI for RFC 7807 compliance
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. } => "https://site-settings.dev/errors/configuration",
            Self::Unauthorized | Self::Forbidden => {
                "https://site-settings.dev/errors/authorization"
            }
            Self::UnknownField { .. } => "https://site-settings.dev/errors/unknown-field",
            Self::InvalidRequest { .. } | Self::Serialization { .. } => {
                "https://site-settings.dev/errors/validation"
            }
            Self::Store { .. } => "https://site-settings.dev/errors/storage",
            Self::Io { .. } | Self::Internal { .. } => "https://site-settings.dev/errors/internal",
        }
    }

    /// Get a human-readable title for the error
    pub fn title(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. } => "Configuration Error",
            Self::Unauthorized | Self::Forbidden => "Authorization Error",
            Self::UnknownField { .. } => "Unknown Setting",
            Self::InvalidRequest { .. } | Self::Serialization { .. } => "Validation Error",
            Self::Store { .. } => "Storage Error",
            Self::Io { .. } | Self::Internal { .. } => "Internal Server Error",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("unknown");

        if self.status_code().is_server_error() {
            error!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Application error occurred"
            );
        } else {
            warn!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        self.log(Some(&request_id));

        let status = self.status_code();
        let error_response = ErrorResponse {
            error_type: self.error_type().to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        Self::InvalidRequest {
            message: err.body_text(),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        Self::InvalidRequest {
            message: err.body_text(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            operation: "io_operation".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
