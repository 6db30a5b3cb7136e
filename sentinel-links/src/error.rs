//! Errors returned by the sentinel-links crate
//!
use std::path::PathBuf;

use snafu::prelude::*;

/// Errors returned by sentinel-links
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LinksError {
    // Http connection or timeout error
    #[snafu(display("HTTP error {method} url:{url}"))]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// Content provider responded with a non-success status.
    /// `details` holds the provider's json error body, when it sent one.
    #[snafu(display("Provider reported error ({code}) {method} {url}: {message}"))]
    Provider {
        code: u16,
        method: String,
        url: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A required credential or setting is missing.
    #[snafu(display("Configuration error: {message}"))]
    Config { message: String },

    /// Missing or invalid request or form fields. No state was changed.
    #[snafu(display("Validation error: {message}"))]
    Validation { message: String },

    /// Deserialization error. The provider sent a body we could not parse.
    #[snafu(display("Deserialization: {source}"))]
    Deserialization { source: serde_json::Error },

    /// Serialization error. unlikely to occur. If you see this error, please report it as a bug.
    #[snafu(display("Serialization: {source}"))]
    Serialization { source: serde_json::Error },

    /// The completion payload did not contain any text.
    #[snafu(display("No content received from API"))]
    EmptyContent,

    /// No link with the given id.
    #[snafu(display("Link {id} not found"))]
    NotFound { id: String },

    /// Reading or writing persisted state failed.
    #[snafu(display("storage {path:?}: {source}"))]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LinksError {
    /// Http status code reported by the provider, if this is a provider error.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Provider error code string (for example, Notion's `object_not_found`), if present.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Provider {
                details: Some(details),
                ..
            } => details.get("code").and_then(serde_json::Value::as_str),
            _ => None,
        }
    }
}
