//! Configured client combining the pipeline and API builders.

use tracing::{info, instrument};

use crate::{
    api::ApiRequestBuilder,
    config::RemitConfig,
    error::Result,
    pipeline::PipelineBuilder,
    shapes::{ApiRequest, GetResultsRequest, GetResultsResponse, PipelineRequest},
    signer::QuerySigner,
    transport::{HttpTransport, Transport},
};

/// Client for one account and one pair of endpoints.
///
/// # Examples
///
/// ```
/// use remit::{
///     Remit,
///     config::RemitConfig,
///     shapes::{PipelineCommon, SingleUsePipeline},
/// };
///
/// # fn example() -> remit::Result<()> {
/// let config = RemitConfig::from_toml(
///     r#"
///     access_key = "AKIAEXAMPLE"
///     secret_key = "secret"
///     sandbox = true
///     "#,
/// )?;
/// let client = Remit::from_config(&config)?;
///
/// let url = client.pipeline_url(&SingleUsePipeline {
///     common: PipelineCommon::returning_to("https://shop.example.com/return"),
///     ..SingleUsePipeline::default()
/// })?;
/// assert!(url.starts_with("https://authorize.payments-sandbox.amazon.com/"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Remit<T: Transport = HttpTransport> {
    pipeline: PipelineBuilder,
    api: ApiRequestBuilder,
    transport: T,
}

impl Remit<HttpTransport> {
    /// Creates a client with an HTTP transport built from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the credentials cannot
    /// be resolved, or the HTTP client cannot be built.
    pub fn from_config(config: &RemitConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Remit<T> {
    /// Creates a client that sends API calls through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the credentials
    /// cannot be resolved.
    #[instrument(skip(config, transport), fields(sandbox = config.sandbox, protocol = transport.protocol_name()))]
    pub fn with_transport(config: &RemitConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials()?;
        let signer = QuerySigner::new(config.signature_method);

        let pipeline =
            PipelineBuilder::new(config.pipeline_endpoint(), credentials.clone())?.with_signer(signer);
        let api = ApiRequestBuilder::new(config.api_endpoint(), credentials)?
            .with_signer(signer)
            .with_version(config.api_version.clone());

        info!(
            api_endpoint = %api.endpoint(),
            pipeline_endpoint = %pipeline.endpoint(),
            "client configured"
        );
        Ok(Self { pipeline, api, transport })
    }

    /// Pipeline URL builder.
    #[must_use]
    pub const fn pipeline(&self) -> &PipelineBuilder {
        &self.pipeline
    }

    /// API call builder.
    #[must_use]
    pub const fn api(&self) -> &ApiRequestBuilder {
        &self.api
    }

    /// Transport used for API calls.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds a signed pipeline URL.
    ///
    /// # Errors
    ///
    /// See [`PipelineBuilder::url`].
    pub fn pipeline_url<P: PipelineRequest>(&self, pipeline: &P) -> Result<String> {
        self.pipeline.url(pipeline)
    }

    /// Performs one typed API call.
    ///
    /// # Errors
    ///
    /// See [`ApiRequestBuilder::call`].
    pub async fn call<R: ApiRequest + Sync>(&self, request: &R) -> Result<R::Response> {
        self.api.call(&self.transport, request).await
    }

    /// Performs `GetResults`.
    ///
    /// # Errors
    ///
    /// See [`ApiRequestBuilder::call`].
    pub async fn get_results(&self, request: &GetResultsRequest) -> Result<GetResultsResponse> {
        self.call(request).await
    }
}
