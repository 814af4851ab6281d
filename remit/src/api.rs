//! Signed server-to-server API calls.
//!
//! [`ApiRequestBuilder`] turns a typed request into a [`SignedCall`]: the shape
//! fields plus `Action`, `AWSAccessKeyId`, `Timestamp` and `Version`, signed
//! with the API endpoint's host and path. [`ApiRequestBuilder::call`] sends it
//! through a [`Transport`] and decodes the JSON body into the typed response.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    coerce::{Payload, Record},
    error::{RemitError, Result},
    params::Parameters,
    pipeline::parse_endpoint,
    shapes::{ApiRequest, FromRecord, standard},
    signer::{Credentials, QuerySigner},
    transport::Transport,
};

/// API version sent as `Version` unless overridden.
pub const DEFAULT_API_VERSION: &str = "2007-01-08";

/// Parameter naming the operation.
pub const ACTION_KEY: &str = "Action";
/// Parameter carrying the access key.
pub const ACCESS_KEY_ID_KEY: &str = "AWSAccessKeyId";
/// Parameter carrying the request time.
pub const TIMESTAMP_KEY: &str = "Timestamp";
/// Parameter carrying the API version.
pub const VERSION_KEY: &str = "Version";

/// A signed call ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    /// API endpoint, without query.
    pub endpoint: Url,
    /// Operation name, as sent in `Action`.
    pub action: String,
    /// Signed query string, signature parameters last.
    pub query: String,
}

impl SignedCall {
    /// Full request URL, `<endpoint>?<query>`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}?{}", self.endpoint, self.query)
    }
}

/// Builds and performs signed API calls against one endpoint.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use remit::{api::ApiRequestBuilder, shapes::GetResultsRequest, signer::Credentials};
///
/// # fn example() -> remit::Result<()> {
/// let builder = ApiRequestBuilder::new(
///     "https://fps.sandbox.amazonaws.com/",
///     Credentials::new("AKIAEXAMPLE", "secret")?,
/// )?;
///
/// let now = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 30).unwrap();
/// let call = builder.build_at(&GetResultsRequest { max_results_count: Some(5), ..Default::default() }, now)?;
///
/// assert_eq!(call.action, "GetResults");
/// assert!(call.query.starts_with(
///     "Action=GetResults&AWSAccessKeyId=AKIAEXAMPLE&Timestamp=2021-01-01T00%3A00%3A30Z&Version=2007-01-08&maxResultsCount=5&"
/// ));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequestBuilder {
    endpoint: Url,
    host: String,
    credentials: Credentials,
    signer: QuerySigner,
    version: String,
}

impl ApiRequestBuilder {
    /// Creates a builder for the API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::EncodingError`](crate::error::RemitError::EncodingError)
    /// if the URL does not parse or has no host.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        let (endpoint, host) = parse_endpoint(endpoint)?;
        Ok(Self {
            endpoint,
            host,
            credentials,
            signer: QuerySigner::default(),
            version: DEFAULT_API_VERSION.to_owned(),
        })
    }

    /// Uses the given signer instead of the default HMAC-SHA256 one.
    #[must_use]
    pub fn with_signer(mut self, signer: QuerySigner) -> Self {
        self.signer = signer;
        self
    }

    /// Sends `version` as the `Version` parameter.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// API endpoint without query.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds a signed call stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field or signing fails.
    pub fn build<R: ApiRequest>(&self, request: &R) -> Result<SignedCall> {
        self.build_at(request, Utc::now())
    }

    /// Builds a signed call stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field or signing fails.
    pub fn build_at<R: ApiRequest>(&self, request: &R, now: DateTime<Utc>) -> Result<SignedCall> {
        self.build_record_at(R::ACTION, &request.to_record()?, now)
    }

    /// Builds a signed call for an arbitrary action from a filled record.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::SchemaConflict`] if a field's wire key is one of
    /// `Action`, `AWSAccessKeyId`, `Timestamp` or `Version`, and otherwise an
    /// error if a value does not fit its field or signing fails.
    #[instrument(skip(self, record, now), fields(shape = record.shape().name(), host = %self.host))]
    pub fn build_record_at(&self, action: &str, record: &Record, now: DateTime<Utc>) -> Result<SignedCall> {
        let params = self.parameters(action, record, now)?;
        let query = self.signer.build_signed_query(
            &self.host,
            self.endpoint.path(),
            self.credentials.secret_key(),
            &params,
        )?;
        debug!(param_count = params.len(), query_len = query.len(), "built signed call");
        Ok(SignedCall { endpoint: self.endpoint.clone(), action: action.to_owned(), query })
    }

    /// Builds, sends and decodes one typed request.
    ///
    /// # Errors
    ///
    /// - Build errors, as for [`build`](Self::build).
    /// - Transport errors, unchanged.
    /// - Decode errors from [`decode_response`].
    #[instrument(skip(self, transport, request), fields(action = R::ACTION, protocol = transport.protocol_name()))]
    pub async fn call<R, T>(&self, transport: &T, request: &R) -> Result<R::Response>
    where
        R: ApiRequest + Sync,
        T: Transport,
    {
        let call = self.build(request)?;
        let response = transport.execute(&call).await?;
        decode_response(&response.body)
    }

    fn parameters(&self, action: &str, record: &Record, now: DateTime<Utc>) -> Result<Parameters> {
        let mut params = Parameters::new();
        params.insert(ACTION_KEY, action);
        params.insert(ACCESS_KEY_ID_KEY, self.credentials.access_key());
        params.insert(TIMESTAMP_KEY, now.to_rfc3339_opts(SecondsFormat::Secs, true));
        params.insert(VERSION_KEY, self.version.as_str());
        for (key, value) in record.to_parameters()?.iter() {
            if params.contains_key(key) {
                return Err(RemitError::conflict(
                    record.shape().name(),
                    format!("field wire key '{key}' collides with a request parameter"),
                ));
            }
            params.insert(key, value);
        }
        Ok(params)
    }
}

/// Decodes a JSON response body into a typed response.
///
/// The body is flattened into a [`Payload`] and decoded against the response
/// shape in the standard catalog. Nothing is returned unless the whole
/// response decodes.
///
/// # Errors
///
/// - [`RemitError::EncodingError`](crate::error::RemitError::EncodingError) if the body
///   is not a JSON object.
/// - [`RemitError::TypeMismatch`](crate::error::RemitError::TypeMismatch) or
///   [`RemitError::MalformedCollection`](crate::error::RemitError::MalformedCollection)
///   if it does not match the shape.
///
/// # Examples
///
/// ```
/// use remit::{api::decode_response, shapes::GetResultsResponse};
///
/// let body = br#"{"numberPending": "1", "transactionResults": [{"transactionId": "t-1"}]}"#;
/// let response: GetResultsResponse = decode_response(body).unwrap();
/// assert_eq!(response.number_pending, Some(1));
/// assert_eq!(response.transaction_results.len(), 1);
/// ```
pub fn decode_response<R: FromRecord>(body: &[u8]) -> Result<R> {
    let payload = Payload::from_json(body)?;
    let record = Record::decode(standard(), R::SHAPE, &payload)?;
    R::from_record(&record)
}
