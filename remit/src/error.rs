//! Error types for remit.
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias over
//! [`RemitError`]. Errors are returned to the immediate caller and are never
//! logged, swallowed or retried inside the library.
//!
//! # Error Categories
//!
//! - **Schema errors** ([`RemitError::SchemaConflict`], [`RemitError::UnknownShape`],
//!   [`RemitError::UnknownField`]): programming errors in shape declarations or in the way a
//!   record is filled in. Not retryable.
//! - **Input errors** ([`RemitError::InvalidCredential`], [`RemitError::EncodingError`],
//!   [`RemitError::ConfigError`]): bad keys, configuration or parameter values.
//! - **Decode errors** ([`RemitError::TypeMismatch`], [`RemitError::MalformedCollection`]):
//!   the service payload does not match the declared response shape. No partial
//!   object is ever returned alongside these.
//! - **Transport errors** ([`RemitError::TransportError`], [`RemitError::HttpError`]):
//!   surfaced unchanged from the transport.
//!
//! # Examples
//!
//! ```
//! use remit::error::{RemitError, Result};
//!
//! fn require_secret(secret: &str) -> Result<&str> {
//!     if secret.is_empty() {
//!         return Err(RemitError::InvalidCredential("secret key is empty".to_owned()));
//!     }
//!     Ok(secret)
//! }
//!
//! assert!(require_secret("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for remit operations.
pub type Result<T> = std::result::Result<T, RemitError>;

/// Errors that can occur while declaring shapes, signing, building or decoding.
///
/// # Error Recovery
///
/// - **Schema errors**: fix the shape declaration or the field name; retrying cannot help.
/// - **Credential/encoding errors**: fix configuration or input values.
/// - **Decode errors**: the service answered with an unexpected payload; report it.
/// - **Transport errors**: the caller decides whether to retry the whole operation.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum RemitError {
    /// A shape or field was declared twice, or two fields share a wire key.
    #[error("schema conflict in shape '{shape}': {reason}")]
    SchemaConflict {
        /// Shape being declared.
        shape: String,
        /// What collided.
        reason: String,
    },

    /// A shape name was looked up but never declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use remit::error::RemitError;
    ///
    /// let err = RemitError::UnknownShape("RefundRequest".to_owned());
    /// assert_eq!(err.to_string(), "unknown shape: RefundRequest");
    /// ```
    #[error("unknown shape: {0}")]
    UnknownShape(String),

    /// A record was given a field its shape does not declare.
    #[error("shape '{shape}' has no field '{field}'")]
    UnknownField {
        /// Shape of the record.
        shape: String,
        /// Offending field name.
        field: String,
    },

    /// The secret key (or another credential) is unusable.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A key, value, host or payload could not be encoded or decoded.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// A value does not fit the coercion kind declared for its field.
    #[error("type mismatch for field '{field}': {reason}")]
    TypeMismatch {
        /// Field (or wire key) being coerced.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// Indexed collection entries have a gap, a duplicate or a bad index.
    #[error("malformed collection '{field}': {reason}")]
    MalformedCollection {
        /// Wire key of the collection.
        field: String,
        /// What was wrong with the entries.
        reason: String,
    },

    /// Configuration failed to parse or validate.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The transport reported a failure, such as a non-success status.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The HTTP client failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, connection refused, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl RemitError {
    pub(crate) fn conflict(shape: &str, reason: impl Into<String>) -> Self {
        Self::SchemaConflict { shape: shape.to_owned(), reason: reason.into() }
    }

    pub(crate) fn mismatch(field: &str, reason: impl Into<String>) -> Self {
        Self::TypeMismatch { field: field.to_owned(), reason: reason.into() }
    }

    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCollection { field: field.to_owned(), reason: reason.into() }
    }
}
