//! `{"error", "description"}` bodies for statuses the bridge reports itself.

use http::StatusCode;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModel {
    pub error: String,
    pub description: String,
}

impl ErrorModel {
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            description: description.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": self.error,
            "description": self.description,
        })
    }
}

pub trait ErrorModelProvider: Send + Sync {
    fn provide(&self, status: u16) -> ErrorModel;

    fn error_json(&self, status: u16) -> Value {
        self.provide(status).to_json()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorModelProvider;

impl ErrorModelProvider for DefaultErrorModelProvider {
    fn provide(&self, status: u16) -> ErrorModel {
        let (error, description) = match status {
            400 => ("Bad Request", "Check the request syntax and parameters and try again."),
            401 => ("Unauthorized", "Authentication required. Please provide valid credentials."),
            403 => (
                "Forbidden",
                "Access denied. You don't have permission to access this resource.",
            ),
            404 => ("Not Found", "The requested resource was not found."),
            429 => ("Too Many Requests", "Request limit exceeded. Please try again later."),
            500 => ("Internal Server Error", "An unexpected error occurred on the server."),
            502 => (
                "Bad Gateway",
                "The server received an invalid response from an upstream server.",
            ),
            _ => return fallback(status),
        };
        ErrorModel::new(error, description)
    }
}

fn fallback(status: u16) -> ErrorModel {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason());
    match (status, reason) {
        (400..=499, Some(reason)) => {
            ErrorModel::new(reason, "A client error occurred. Please check your request.")
        }
        (500..=599, Some(reason)) => ErrorModel::new(
            reason,
            "An unexpected server error occurred. Please try again later.",
        ),
        _ => ErrorModel::new("Unexpected Server Response", "Please try again."),
    }
}
