//! HTTP transport implementation.
//!
//! Signed calls are sent as HTTPS `GET` requests with the signed query
//! appended to the endpoint URL.

use std::{sync::LazyLock, time::Duration};

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    api::SignedCall,
    error::{RemitError, Result},
    transport::{Transport, TransportResponse},
};

/// Default HTTP client with connection pooling enabled.
///
/// Shared by every transport created with [`HttpTransport::new`].
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    #[allow(clippy::expect_used, reason = "static builder settings cannot fail")]
    Client::builder()
        .pool_max_idle_per_host(100)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create default HTTP client")
});

/// Validates URL for security constraints.
///
/// Ensures the URL uses HTTPS and does not point to a loopback host.
pub(crate) fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(RemitError::TransportError("Only HTTPS URLs are allowed".to_owned()));
    }

    if let Some(host) = url.host_str() {
        let host = host.to_ascii_lowercase();
        if host == "localhost" || host.starts_with("127.") || host == "::1" || host == "[::1]" {
            return Err(RemitError::TransportError("Localhost URLs are not allowed".to_owned()));
        }
    }

    Ok(())
}

/// Rejects paths containing directory traversal sequences.
fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(RemitError::TransportError(
            "Invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    Ok(path)
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Supports connection pooling, keep-alive, and HTTP/2 multiplexing.
///
/// # Examples
///
/// ```
/// use remit::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl HttpTransport {
    /// Creates a new HTTP transport with default settings.
    ///
    /// Default configuration:
    /// - Pool max idle per host: 100
    /// - Timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - HTTP version: Auto (prefer HTTP/2)
    ///
    /// # Errors
    ///
    /// This method is infallible but returns `Result` for API consistency.
    pub fn new() -> Result<Self> {
        Ok(Self { client: DEFAULT_HTTP_CLIENT.clone(), http_version: HttpVersion::Auto })
    }

    /// Creates HTTP transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::ConfigError`] if the configuration is out of bounds,
    /// or [`RemitError::HttpError`] if the client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(RemitError::HttpError)?;

        Ok(Self { client, http_version: config.http_version })
    }
}

impl Transport for HttpTransport {
    #[instrument(
        skip(self, call),
        fields(action = %call.action, host = call.endpoint.host_str(), protocol = self.protocol_name())
    )]
    async fn execute<'a>(&'a self, call: &'a SignedCall) -> Result<TransportResponse> {
        validate_url(&call.endpoint)?;
        sanitize_path(call.endpoint.path())?;

        let response = self.client.get(call.url()).send().await?;
        let status = response.status().as_u16();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        if !response.status().is_success() {
            return Err(RemitError::TransportError(format!(
                "{} returned status {status}",
                call.action
            )));
        }

        let body = response.bytes().await.map_err(RemitError::HttpError)?.to_vec();
        debug!(status, body_len = body.len(), "received response");

        Ok(TransportResponse { status, body, headers })
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
