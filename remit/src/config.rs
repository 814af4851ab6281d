//! Client configuration.
//!
//! [`RemitConfig`] is deserialized from TOML:
//!
//! ```toml
//! access_key = "AKIAEXAMPLE"
//! secret_key_env = "REMIT_SECRET_KEY"
//! sandbox = true
//! signature_method = "HmacSHA256"
//!
//! [http]
//! timeout_secs = 20
//! ```
//!
//! The secret is read either inline (`secret_key`) or from the environment
//! variable named by `secret_key_env`. Endpoints default to the production or
//! sandbox service depending on `sandbox`, and can be overridden one by one.

use std::{fs, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{
    api::DEFAULT_API_VERSION,
    error::{RemitError, Result},
    signer::{Credentials, SignatureMethod},
    transport::{HttpConfig, http::validate_url},
};

/// Production API endpoint.
pub const PRODUCTION_API_ENDPOINT: &str = "https://fps.amazonaws.com/";
/// Production pipeline endpoint.
pub const PRODUCTION_PIPELINE_ENDPOINT: &str =
    "https://authorize.payments.amazon.com/cobranded-ui/actions/start";
/// Sandbox API endpoint.
pub const SANDBOX_API_ENDPOINT: &str = "https://fps.sandbox.amazonaws.com/";
/// Sandbox pipeline endpoint.
pub const SANDBOX_PIPELINE_ENDPOINT: &str =
    "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start";

/// Root client configuration.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemitConfig {
    /// Public access key.
    pub access_key: String,

    /// Inline secret key. Prefer `secret_key_env` outside of tests.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Name of the environment variable holding the secret key.
    #[serde(default)]
    pub secret_key_env: Option<String>,

    /// Use the sandbox endpoints.
    #[serde(default)]
    pub sandbox: bool,

    /// API endpoint override.
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Pipeline endpoint override.
    #[serde(default)]
    pub pipeline_endpoint: Option<String>,

    /// Value sent as `Version` on API calls.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Signature method for every request.
    #[serde(default)]
    pub signature_method: SignatureMethod,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl std::fmt::Debug for RemitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemitConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key_env", &self.secret_key_env)
            .field("sandbox", &self.sandbox)
            .field("api_endpoint", &self.api_endpoint)
            .field("pipeline_endpoint", &self.pipeline_endpoint)
            .field("api_version", &self.api_version)
            .field("signature_method", &self.signature_method)
            .field("http", &self.http)
            .finish()
    }
}

impl RemitConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::ConfigError`] if the document does not parse or
    /// does not validate.
    ///
    /// # Examples
    ///
    /// ```
    /// use remit::config::RemitConfig;
    ///
    /// let config = RemitConfig::from_toml(
    ///     r#"
    ///     access_key = "AKIAEXAMPLE"
    ///     secret_key = "secret"
    ///     sandbox = true
    ///     "#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(config.api_endpoint(), "https://fps.sandbox.amazonaws.com/");
    /// ```
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RemitError::ConfigError(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::ConfigError`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            RemitError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - the access key is not empty
    /// - exactly one of `secret_key` and `secret_key_env` is given
    /// - both endpoints are HTTPS and not loopback
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            return Err(RemitError::ConfigError("access_key cannot be empty".to_owned()));
        }

        match (&self.secret_key, &self.secret_key_env) {
            (Some(_), Some(_)) => {
                return Err(RemitError::ConfigError(
                    "set only one of secret_key and secret_key_env".to_owned(),
                ));
            }
            (None, None) => {
                return Err(RemitError::ConfigError(
                    "one of secret_key or secret_key_env is required".to_owned(),
                ));
            }
            (None, Some(name)) => validate_env_var_name(name)?,
            (Some(_), None) => {}
        }

        if self.api_version.trim().is_empty() {
            return Err(RemitError::ConfigError("api_version cannot be empty".to_owned()));
        }

        validate_endpoint("api_endpoint", self.api_endpoint())?;
        validate_endpoint("pipeline_endpoint", self.pipeline_endpoint())?;
        self.http.validate()
    }

    /// Effective API endpoint.
    #[must_use]
    pub fn api_endpoint(&self) -> &str {
        match (&self.api_endpoint, self.sandbox) {
            (Some(url), _) => url,
            (None, true) => SANDBOX_API_ENDPOINT,
            (None, false) => PRODUCTION_API_ENDPOINT,
        }
    }

    /// Effective pipeline endpoint.
    #[must_use]
    pub fn pipeline_endpoint(&self) -> &str {
        match (&self.pipeline_endpoint, self.sandbox) {
            (Some(url), _) => url,
            (None, true) => SANDBOX_PIPELINE_ENDPOINT,
            (None, false) => PRODUCTION_PIPELINE_ENDPOINT,
        }
    }

    /// Resolves the credentials, reading the secret from the environment if
    /// configured so.
    ///
    /// # Errors
    ///
    /// - [`RemitError::ConfigError`] if the environment variable is missing.
    /// - [`RemitError::InvalidCredential`] if a key is empty.
    pub fn credentials(&self) -> Result<Credentials> {
        let secret = match (&self.secret_key, &self.secret_key_env) {
            (Some(secret), _) => secret.clone(),
            (None, Some(name)) => std::env::var(name).map_err(|e| {
                RemitError::ConfigError(format!("cannot read secret from ${name}: {e}"))
            })?,
            (None, None) => {
                return Err(RemitError::ConfigError(
                    "one of secret_key or secret_key_env is required".to_owned(),
                ));
            }
        };
        Credentials::new(self.access_key.clone(), secret)
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

fn validate_endpoint(name: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| RemitError::ConfigError(format!("invalid {name} '{raw}': {e}")))?;
    validate_url(&url).map_err(|e| RemitError::ConfigError(format!("{name}: {e}")))
}

fn validate_env_var_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RemitError::ConfigError(format!(
            "secret_key_env is not a valid environment variable name: '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        access_key = "AKIAEXAMPLE"
        secret_key = "secret"
    "#;

    #[test]
    fn test_minimal_config_uses_production() {
        let config = RemitConfig::from_toml(MINIMAL).unwrap();
        assert!(!config.sandbox);
        assert_eq!(config.api_endpoint(), PRODUCTION_API_ENDPOINT);
        assert_eq!(config.pipeline_endpoint(), PRODUCTION_PIPELINE_ENDPOINT);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.signature_method, SignatureMethod::HmacSha256);
    }

    #[test]
    fn test_sandbox_endpoints() {
        let config = RemitConfig::from_toml(&format!("{MINIMAL}\nsandbox = true")).unwrap();
        assert_eq!(config.api_endpoint(), SANDBOX_API_ENDPOINT);
        assert_eq!(config.pipeline_endpoint(), SANDBOX_PIPELINE_ENDPOINT);
    }

    #[test]
    fn test_endpoint_override() {
        let toml = format!("{MINIMAL}\nsandbox = true\napi_endpoint = \"https://fps.eu.example.com/\"");
        let config = RemitConfig::from_toml(&toml).unwrap();
        assert_eq!(config.api_endpoint(), "https://fps.eu.example.com/");
        assert_eq!(config.pipeline_endpoint(), SANDBOX_PIPELINE_ENDPOINT);
    }

    #[test]
    fn test_http_table_and_legacy_signature() {
        let toml = format!(
            "{MINIMAL}\nsignature_method = \"HmacSHA1\"\n[http]\ntimeout_secs = 20\nhttp_version = \"http1\""
        );
        let config = RemitConfig::from_toml(&toml).unwrap();
        assert_eq!(config.signature_method, SignatureMethod::HmacSha1);
        assert_eq!(config.http.timeout_secs, 20);
    }

    #[test]
    fn test_rejects_plain_http_endpoint() {
        let toml = format!("{MINIMAL}\napi_endpoint = \"http://fps.amazonaws.com/\"");
        let err = RemitConfig::from_toml(&toml).unwrap_err();
        assert!(matches!(err, RemitError::ConfigError(ref m) if m.contains("api_endpoint")));
    }

    #[test]
    fn test_rejects_loopback_endpoint() {
        let toml = format!("{MINIMAL}\npipeline_endpoint = \"https://127.0.0.1/start\"");
        assert!(RemitConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_rejects_missing_secret() {
        let err = RemitConfig::from_toml("access_key = \"AKIAEXAMPLE\"").unwrap_err();
        assert!(err.to_string().contains("secret_key"));
    }

    #[test]
    fn test_rejects_both_secrets() {
        let toml = format!("{MINIMAL}\nsecret_key_env = \"REMIT_SECRET\"");
        assert!(RemitConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_rejects_bad_env_var_name() {
        let toml = "access_key = \"A\"\nsecret_key_env = \"1-SECRET\"";
        assert!(RemitConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let toml = format!("{MINIMAL}\n[http]\ntimeout_secs = 0");
        assert!(RemitConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_rejects_unknown_key() {
        let toml = format!("{MINIMAL}\nregion = \"eu\"");
        assert!(matches!(RemitConfig::from_toml(&toml), Err(RemitError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_unknown_signature_method() {
        let toml = format!("{MINIMAL}\nsignature_method = \"HmacMD5\"");
        assert!(RemitConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_inline_credentials() {
        let config = RemitConfig::from_toml(MINIMAL).unwrap();
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.access_key(), "AKIAEXAMPLE");
        assert_eq!(credentials.secret_key(), "secret");
    }

    #[test]
    fn test_missing_env_secret() {
        let toml = "access_key = \"A\"\nsecret_key_env = \"REMIT_TEST_SECRET_THAT_IS_NOT_SET\"";
        let config = RemitConfig::from_toml(toml).unwrap();
        assert!(matches!(config.credentials(), Err(RemitError::ConfigError(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = RemitConfig::from_toml(MINIMAL).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"secret\""));
    }
}
