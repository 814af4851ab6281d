//! Access key and secret key pair.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{RemitError, Result};

/// Account credentials used to identify and sign requests.
///
/// The secret key is wiped from memory when the value is dropped and is never
/// printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: Zeroizing<String>,
}

impl Credentials {
    /// Creates credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RemitError::InvalidCredential`] if either key is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use remit::signer::Credentials;
    ///
    /// let credentials = Credentials::new("AKIAEXAMPLE", "hunter2").unwrap();
    /// assert_eq!(credentials.access_key(), "AKIAEXAMPLE");
    /// assert!(!format!("{credentials:?}").contains("hunter2"));
    ///
    /// assert!(Credentials::new("AKIAEXAMPLE", "").is_err());
    /// ```
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let access_key = access_key.into();
        let secret_key = Zeroizing::new(secret_key.into());
        if access_key.is_empty() {
            return Err(RemitError::InvalidCredential("access key is empty".to_owned()));
        }
        if secret_key.is_empty() {
            return Err(RemitError::InvalidCredential("secret key is empty".to_owned()));
        }
        Ok(Self { access_key, secret_key })
    }

    /// Public access key identifier.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Secret signing key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
