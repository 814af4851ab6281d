//! Signed redirect URLs for hosted payment pipelines.
//!
//! A pipeline URL hands the buyer to an externally operated payment page. The
//! URL carries every set field of the pipeline variant plus the signature
//! parameters; building it performs no I/O.
//!
//! # Examples
//!
//! ```
//! use remit::{
//!     pipeline::PipelineBuilder,
//!     shapes::{PipelineCommon, RecurringUsePipeline},
//!     signer::Credentials,
//! };
//!
//! # fn example() -> remit::Result<()> {
//! let builder = PipelineBuilder::new(
//!     "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start",
//!     Credentials::new("AKIAEXAMPLE", "secret")?,
//! )?;
//!
//! let url = builder.url(&RecurringUsePipeline {
//!     common: PipelineCommon::returning_to("https://shop.example.com/return"),
//!     caller_reference: Some("sub-42".to_owned()),
//!     recurring_period: Some("1 Month".to_owned()),
//!     ..RecurringUsePipeline::default()
//! })?;
//!
//! assert!(url.starts_with(
//!     "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start?pipelineName=Recurring&"
//! ));
//! assert!(url.contains("&callerKey=AKIAEXAMPLE&"));
//! assert!(url.contains("&recurringPeriod=1%20Month&"));
//! # Ok(())
//! # }
//! ```

use tracing::{debug, instrument};
use url::Url;

use crate::{
    coerce::Record,
    error::{RemitError, Result},
    params::Parameters,
    shapes::PipelineRequest,
    signer::{Credentials, QuerySigner},
};

/// Builds signed pipeline URLs against one pipeline endpoint.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    endpoint: Url,
    host: String,
    credentials: Credentials,
    signer: QuerySigner,
}

impl PipelineBuilder {
    /// Creates a builder for the pipeline endpoint.
    ///
    /// Any query string already on `pipeline_url` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::EncodingError`] if the URL does not parse or has no host.
    pub fn new(pipeline_url: &str, credentials: Credentials) -> Result<Self> {
        let (endpoint, host) = parse_endpoint(pipeline_url)?;
        Ok(Self { endpoint, host, credentials, signer: QuerySigner::default() })
    }

    /// Uses the given signer instead of the default HMAC-SHA256 one.
    #[must_use]
    pub fn with_signer(mut self, signer: QuerySigner) -> Self {
        self.signer = signer;
        self
    }

    /// Pipeline endpoint without query.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Wire parameters of a pipeline variant, with defaults applied.
    ///
    /// An unset `pipeline_name` becomes the variant's [`PipelineRequest::PIPELINE_NAME`]
    /// and an unset `caller_key` becomes the access key.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its declared field.
    pub fn parameters<P: PipelineRequest>(&self, pipeline: &P) -> Result<Parameters> {
        let mut record = pipeline.to_record()?;
        self.apply_defaults(&mut record, P::PIPELINE_NAME)?;
        record.to_parameters()
    }

    /// Builds `<pipeline url>?<signed query>` for a typed pipeline variant.
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit its field or signing fails.
    #[instrument(skip(self, pipeline), fields(shape = P::SHAPE, host = %self.host))]
    pub fn url<P: PipelineRequest>(&self, pipeline: &P) -> Result<String> {
        let params = self.parameters(pipeline)?;
        self.signed_url(&params)
    }

    /// Builds a pipeline URL from an already filled record.
    ///
    /// `caller_key` defaults to the access key; `pipeline_name` must be set by
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::UnknownField`] if the record's shape is not a
    /// pipeline, or an error if encoding or signing fails.
    #[instrument(skip(self, record), fields(shape = record.shape().name(), host = %self.host))]
    pub fn record_url(&self, record: &Record) -> Result<String> {
        let mut record = record.clone();
        if !record.is_set("caller_key") {
            record.set("caller_key", self.credentials.access_key())?;
        }
        self.signed_url(&record.to_parameters()?)
    }

    fn apply_defaults(&self, record: &mut Record, pipeline_name: &str) -> Result<()> {
        if !record.is_set("pipeline_name") {
            record.set("pipeline_name", pipeline_name)?;
        }
        if !record.is_set("caller_key") {
            record.set("caller_key", self.credentials.access_key())?;
        }
        Ok(())
    }

    fn signed_url(&self, params: &Parameters) -> Result<String> {
        let query = self.signer.build_signed_query(
            &self.host,
            self.endpoint.path(),
            self.credentials.secret_key(),
            params,
        )?;
        debug!(param_count = params.len(), query_len = query.len(), "built pipeline url");
        Ok(format!("{}?{query}", self.endpoint))
    }
}

/// Parses an endpoint URL, returning it without query or fragment, and its host.
pub(crate) fn parse_endpoint(raw: &str) -> Result<(Url, String)> {
    let mut url = Url::parse(raw)
        .map_err(|e| RemitError::EncodingError(format!("invalid endpoint URL '{raw}': {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| RemitError::EncodingError(format!("endpoint URL has no host: {raw}")))?
        .to_owned();
    url.set_query(None);
    url.set_fragment(None);
    Ok((url, host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        shapes::{PipelineCommon, SingleUsePipeline, standard},
        signer,
    };

    const PIPELINE: &str = "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start";

    fn builder() -> PipelineBuilder {
        PipelineBuilder::new(PIPELINE, Credentials::new("AKIAEXAMPLE", "secret-key").unwrap())
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let params = builder().parameters(&SingleUsePipeline::default()).unwrap();
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            [("pipelineName", "SingleUse"), ("callerKey", "AKIAEXAMPLE")]
        );
    }

    #[test]
    fn test_explicit_caller_key_wins() {
        let pipeline = SingleUsePipeline {
            common: PipelineCommon {
                pipeline_name: Some("MultiUse".to_owned()),
                caller_key: Some("AKIAOTHER".to_owned()),
                ..PipelineCommon::default()
            },
            ..SingleUsePipeline::default()
        };
        let params = builder().parameters(&pipeline).unwrap();
        assert_eq!(params.get("callerKey"), Some("AKIAOTHER"));
        assert_eq!(params.get("pipelineName"), Some("MultiUse"));
    }

    #[test]
    fn test_url_signature_matches_signer() {
        let pipeline = SingleUsePipeline {
            common: PipelineCommon::returning_to("https://shop.example.com/return"),
            ..SingleUsePipeline::default()
        };
        let builder = builder();
        let url = builder.url(&pipeline).unwrap();

        let params = builder.parameters(&pipeline).unwrap();
        let query = signer::build_signed_query(
            "authorize.payments-sandbox.amazon.com",
            "/cobranded-ui/actions/start",
            "secret-key",
            &params,
        )
        .unwrap();
        assert_eq!(url, format!("{PIPELINE}?{query}"));
    }

    #[test]
    fn test_existing_query_is_dropped() {
        let builder = PipelineBuilder::new(
            &format!("{PIPELINE}?stale=1#frag"),
            Credentials::new("AKIAEXAMPLE", "secret-key").unwrap(),
        )
        .unwrap();
        let url = builder.url(&SingleUsePipeline::default()).unwrap();
        assert!(url.starts_with(&format!("{PIPELINE}?pipelineName=SingleUse&")));
        assert!(!url.contains("stale"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let credentials = Credentials::new("AKIAEXAMPLE", "secret-key").unwrap();
        assert!(matches!(
            PipelineBuilder::new("not a url", credentials),
            Err(RemitError::EncodingError(_))
        ));
    }

    #[test]
    fn test_record_url_fills_caller_key() {
        let record = Record::new(standard(), "SingleUsePipeline")
            .unwrap()
            .with("pipeline_name", "SingleUse")
            .unwrap();
        let url = builder().record_url(&record).unwrap();
        assert!(url.contains("?pipelineName=SingleUse&callerKey=AKIAEXAMPLE&SignatureMethod="));
    }

    #[test]
    fn test_record_url_rejects_non_pipeline_shape() {
        let record = Record::new(standard(), "GetResultsRequest").unwrap();
        assert!(matches!(
            builder().record_url(&record),
            Err(RemitError::UnknownField { .. })
        ));
    }
}
