//! Canonical query signing.
//!
//! Requests are authenticated with a keyed MAC over a canonical form of the
//! request, and the base64 MAC is appended as the `Signature` parameter.
//!
//! # Canonical String
//!
//! ```text
//! GET
//! <host, lowercased>
//! <path, "/" when empty>
//! <k1>=<v1>&<k2>=<v2>...
//! ```
//!
//! The pairs cover every request parameter plus `SignatureMethod` and
//! `SignatureVersion`, sorted by key byte-wise, with keys and values
//! percent-encoded (only `A-Z a-z 0-9 - . _ ~` are left as is). There is no
//! trailing newline.
//!
//! # Examples
//!
//! ```
//! use remit::{Parameters, signer};
//!
//! # fn example() -> remit::Result<()> {
//! let params: Parameters = [("Action", "GetResults"), ("maxResultsCount", "10")].into_iter().collect();
//!
//! let query = signer::build_signed_query("fps.sandbox.amazonaws.com", "/", "secret", &params)?;
//! assert!(query.starts_with("Action=GetResults&maxResultsCount=10&SignatureMethod=HmacSHA256"));
//! assert!(query.contains("&SignatureVersion=2&Signature="));
//! # Ok(())
//! # }
//! ```

mod credentials;

use std::{fmt, str::FromStr};

use base64::Engine;
pub use credentials::Credentials;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::{
    error::{RemitError, Result},
    params::Parameters,
};

/// Parameter carrying the signature method identifier.
pub const SIGNATURE_METHOD_KEY: &str = "SignatureMethod";
/// Parameter carrying the signature version identifier.
pub const SIGNATURE_VERSION_KEY: &str = "SignatureVersion";
/// Parameter carrying the base64 signature.
pub const SIGNATURE_KEY: &str = "Signature";
/// Signature version of the canonical form implemented here.
pub const SIGNATURE_VERSION: &str = "2";

const HTTP_METHOD: &str = "GET";

/// MAC algorithm used for the signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SignatureMethod {
    /// HMAC with SHA-256.
    #[default]
    #[serde(rename = "HmacSHA256")]
    HmacSha256,
    /// HMAC with SHA-1, for services that still expect it.
    #[serde(rename = "HmacSHA1")]
    HmacSha1,
}

impl SignatureMethod {
    /// Identifier sent as `SignatureMethod`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::HmacSha256 => "HmacSHA256",
            Self::HmacSha1 => "HmacSHA1",
        }
    }

    fn mac(self, secret_key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let invalid = |e: hmac::digest::InvalidLength| RemitError::InvalidCredential(e.to_string());
        Ok(match self {
            Self::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret_key).map_err(invalid)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Self::HmacSha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(secret_key).map_err(invalid)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        })
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SignatureMethod {
    type Err = RemitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HmacSHA256" => Ok(Self::HmacSha256),
            "HmacSHA1" => Ok(Self::HmacSha1),
            other => Err(RemitError::ConfigError(format!("unsupported signature method: {other}"))),
        }
    }
}

/// Signs parameter sets for one signature method.
///
/// Holds no per-request state; one signer can be shared by any number of
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySigner {
    method: SignatureMethod,
}

impl QuerySigner {
    /// Creates a signer for the given method.
    #[must_use]
    pub const fn new(method: SignatureMethod) -> Self {
        Self { method }
    }

    /// Signature method in use.
    #[must_use]
    pub const fn method(&self) -> SignatureMethod {
        self.method
    }

    /// Computes the base64 signature of a parameter set.
    ///
    /// The result depends only on the host, path, secret and the set of
    /// parameters, not on the order they were inserted in.
    ///
    /// # Errors
    ///
    /// - [`RemitError::InvalidCredential`] if the secret key is empty.
    /// - [`RemitError::EncodingError`] if the host or a key is empty, or a key or
    ///   value contains a NUL character.
    #[instrument(skip(self, secret_key, params), fields(method = %self.method, param_count = params.len()))]
    pub fn sign(&self, host: &str, path: &str, secret_key: &str, params: &Parameters) -> Result<String> {
        if secret_key.is_empty() {
            return Err(RemitError::InvalidCredential("secret key is empty".to_owned()));
        }
        let canonical = self.canonical_string(host, path, params)?;
        let mac = self.method.mac(secret_key.as_bytes(), canonical.as_bytes())?;
        debug!(canonical_len = canonical.len(), "computed request signature");
        Ok(base64::engine::general_purpose::STANDARD.encode(mac))
    }

    /// Builds the full signed query string.
    ///
    /// Parameters are emitted in insertion order, followed by
    /// `SignatureMethod`, `SignatureVersion` and `Signature`.
    ///
    /// # Errors
    ///
    /// Same as [`sign`](Self::sign).
    pub fn build_signed_query(
        &self,
        host: &str,
        path: &str,
        secret_key: &str,
        params: &Parameters,
    ) -> Result<String> {
        let signature = self.sign(host, path, secret_key, params)?;

        let mut pairs: Vec<String> = params
            .iter()
            .filter(|(k, _)| !is_signature_key(k))
            .map(|(k, v)| encode_pair(k, v))
            .collect();
        pairs.push(encode_pair(SIGNATURE_METHOD_KEY, self.method.id()));
        pairs.push(encode_pair(SIGNATURE_VERSION_KEY, SIGNATURE_VERSION));
        pairs.push(encode_pair(SIGNATURE_KEY, &signature));
        Ok(pairs.join("&"))
    }

    /// Builds the exact string the MAC is computed over.
    pub(crate) fn canonical_string(&self, host: &str, path: &str, params: &Parameters) -> Result<String> {
        if host.is_empty() {
            return Err(RemitError::EncodingError("endpoint host is empty".to_owned()));
        }
        for (key, value) in params.iter() {
            validate_pair(key, value)?;
        }

        let mut sorted: Vec<(&str, &str)> = params
            .iter()
            .filter(|(k, _)| !is_signature_key(k))
            .collect();
        sorted.push((SIGNATURE_METHOD_KEY, self.method.id()));
        sorted.push((SIGNATURE_VERSION_KEY, SIGNATURE_VERSION));
        sorted.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let query = sorted.iter().map(|(k, v)| encode_pair(k, v)).collect::<Vec<_>>().join("&");
        let path = if path.is_empty() { "/" } else { path };

        Ok(format!("{HTTP_METHOD}\n{}\n{path}\n{query}", host.to_ascii_lowercase()))
    }
}

/// Signs with the default method (HMAC-SHA256).
///
/// # Errors
///
/// See [`QuerySigner::sign`].
pub fn sign(host: &str, path: &str, secret_key: &str, params: &Parameters) -> Result<String> {
    QuerySigner::default().sign(host, path, secret_key, params)
}

/// Builds a signed query string with the default method (HMAC-SHA256).
///
/// # Errors
///
/// See [`QuerySigner::sign`].
pub fn build_signed_query(host: &str, path: &str, secret_key: &str, params: &Parameters) -> Result<String> {
    QuerySigner::default().build_signed_query(host, path, secret_key, params)
}

fn is_signature_key(key: &str) -> bool {
    matches!(key, SIGNATURE_METHOD_KEY | SIGNATURE_VERSION_KEY | SIGNATURE_KEY)
}

fn validate_pair(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RemitError::EncodingError("parameter key is empty".to_owned()));
    }
    if key.contains('\0') || value.contains('\0') {
        return Err(RemitError::EncodingError(format!("parameter '{key}' contains a NUL character")));
    }
    Ok(())
}

fn encode_pair(key: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
}
