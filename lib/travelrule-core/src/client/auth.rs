use std::fmt;

use hmac::{Hmac, Mac};
use http::HeaderValue;
use reqwest::header::HeaderName;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on signed requests.
pub const API_KEY_HEADER: &str = "x-mbx-apikey";

/// Errors that can occur while signing a request.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// API key contains invalid characters for HTTP headers.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// The secret cannot be used as an HMAC key.
    #[display("Invalid signing secret: {message}")]
    InvalidSecret {
        /// Description of the failure.
        message: String,
    },

    /// A credential environment variable is not set.
    #[display("Environment variable '{name}' is not set")]
    MissingEnvironmentVariable {
        /// The variable name.
        name: String,
    },
}

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            let head = value.get(..4).unwrap_or_default();
            let tail = value.get(value.len() - 4..).unwrap_or_default();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// API key and secret used to sign requests.
///
/// # Examples
///
/// ```rust
/// use travelrule_core::Credentials;
///
/// let credentials = Credentials::new("my-api-key", "my-api-secret");
/// assert_eq!(credentials.api_key().as_str(), "my-api-key");
///
/// // Secrets never leak through Debug
/// assert!(!format!("{credentials:?}").contains("my-api-secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: SecureString,
    secret: SecureString,
}

impl Credentials {
    /// Creates credentials from an API key and its secret.
    pub fn new(api_key: impl Into<SecureString>, secret: impl Into<SecureString>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Loads credentials from two environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::MissingEnvironmentVariable`] if a variable is unset.
    pub fn from_env(api_key_var: &str, secret_var: &str) -> Result<Self, AuthenticationError> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| AuthenticationError::MissingEnvironmentVariable {
                name: name.to_string(),
            })
        };
        let api_key = read(api_key_var)?;
        let secret = read(secret_var)?;
        Ok(Self::new(api_key, secret))
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &SecureString {
        &self.api_key
    }

    /// Builds the API key header sent alongside signed requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the key contains characters not valid in a header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        let mut value = HeaderValue::from_str(self.api_key.as_str()).map_err(|e| {
            AuthenticationError::InvalidApiKey {
                message: e.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok((HeaderName::from_static(API_KEY_HEADER), value))
    }

    /// Computes the hex encoded HMAC-SHA256 signature of `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be used as an HMAC key.
    pub fn sign(&self, payload: &str) -> Result<String, AuthenticationError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_str().as_bytes()).map_err(|e| {
            AuthenticationError::InvalidSecret {
                message: e.to_string(),
            }
        })?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.to_string())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
