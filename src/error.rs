//! Unified error handling for the vsts-client library.
//!
//! Every public operation returns [`Result`], whose error type [`VstsError`]
//! separates the four ways a call can fail so callers can branch on them.
//!
//! ## Error Categories
//!
//! - [`VstsError::Validation`]: a required argument was empty, nothing was sent
//! - [`VstsError::Transport`]: the request never completed (DNS, connect, timeout)
//! - [`VstsError::Http`]: the service answered with a status of 300 or above
//! - [`VstsError::Decode`]: the response did not match the expected schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use vsts_client::error::{VstsError, HttpError};
//!
//! fn describe(err: &VstsError) -> String {
//!     match err {
//!         VstsError::Http(HttpError { status: 404, .. }) => "not found".to_string(),
//!         other => other.to_string(),
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a transport or credential collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for the vsts-client library.
#[derive(Error, Debug)]
pub enum VstsError {
    /// A required argument was missing or empty. Raised before any network call.
    #[error("Argument '{argument}' must not be empty")]
    Validation {
        /// Name of the offending argument.
        argument: String,
    },

    /// The transport failed to complete the exchange.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The service rejected the request.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response could not be decoded into the expected record.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// A local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VstsError {
    /// Builds a validation error for the named argument.
    pub fn validation(argument: impl Into<String>) -> Self {
        Self::Validation {
            argument: argument.into(),
        }
    }

    /// Returns the HTTP status when the service rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}

/// A response with a status code of 300 or above.
///
/// This is the only error the dispatcher constructs itself. The raw body is
/// kept byte-for-byte so callers can inspect the service's error payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Request failed with status {status} {reason}")]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`.
    pub reason: String,
    /// Response headers with lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpError {
    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Extracts the `message` field the service puts in its JSON error bodies.
    #[must_use]
    pub fn service_message(&self) -> Option<String> {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }
}

/// Errors raised while turning a response body into a record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body was not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON object was expected.
    #[error("expected a JSON object for {record}")]
    NotAnObject {
        /// Record being decoded.
        record: &'static str,
    },

    /// A required attribute was absent.
    #[error("{record} is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Record being decoded.
        record: &'static str,
        /// JSON key that was expected.
        attribute: &'static str,
    },

    /// An attribute was present but had the wrong shape.
    #[error("{record} attribute '{attribute}' has an unexpected shape: {source}")]
    InvalidAttribute {
        /// Record being decoded.
        record: &'static str,
        /// JSON key being decoded.
        attribute: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A query result carried both row representations.
    #[error("query result contains both 'workItems' and 'workItemRelations'")]
    AmbiguousQueryRows,
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("{field} is required (use the {env_var} env var or the config file)")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
        /// Environment variable name for this field.
        env_var: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// The client could not be constructed from the configuration.
    #[error("Failed to build client: {0}")]
    Client(#[from] VstsError),
}

/// Type alias for Results using VstsError.
pub type Result<T> = std::result::Result<T, VstsError>;
