//! Transport abstraction for signed API calls.
//!
//! The API builder produces a [`SignedCall`]; a [`Transport`] performs it and
//! hands back the raw response. Transports never retry and never interpret
//! the body; a non-success status is reported as
//! [`RemitError::TransportError`](crate::error::RemitError::TransportError).
//!
//! # Examples
//!
//! ```rust,no_run
//! use remit::{
//!     api::ApiRequestBuilder,
//!     shapes::GetResultsRequest,
//!     signer::Credentials,
//!     transport::{HttpTransport, Transport},
//! };
//!
//! # async fn example() -> remit::Result<()> {
//! let transport = HttpTransport::new()?;
//! let builder = ApiRequestBuilder::new(
//!     "https://fps.sandbox.amazonaws.com/",
//!     Credentials::new("AKIAEXAMPLE", "secret")?,
//! )?;
//!
//! let call = builder.build(&GetResultsRequest::default())?;
//! let response = transport.execute(&call).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::{api::SignedCall, error::Result};

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Response from a transport.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code (or protocol equivalent).
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

/// Performs signed API calls.
///
/// Implement this for test doubles or alternative clients; [`HttpTransport`]
/// is the reqwest-backed implementation.
///
/// # Examples
///
/// ```
/// use remit::{
///     api::SignedCall,
///     transport::{Transport, TransportResponse},
/// };
///
/// struct Canned(&'static [u8]);
///
/// impl Transport for Canned {
///     async fn execute<'a>(&'a self, _call: &'a SignedCall) -> remit::Result<TransportResponse> {
///         Ok(TransportResponse { status: 200, body: self.0.to_vec(), headers: vec![] })
///     }
///
///     fn protocol_name(&self) -> &'static str {
///         "canned"
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Performs one request for the call.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::TransportError`](crate::error::RemitError::TransportError)
    /// for rejected endpoints or non-success statuses, and
    /// [`RemitError::HttpError`](crate::error::RemitError::HttpError) when the
    /// client fails.
    fn execute<'a>(
        &'a self,
        call: &'a SignedCall,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    ///
    /// Examples: "http/1.1", "http/2"
    fn protocol_name(&self) -> &'static str;
}
