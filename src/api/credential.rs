//! PAT-based credential for the work item tracking API.
//!
//! The service accepts a Personal Access Token as the password of a Basic
//! authorization header with an empty user name.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

/// Produces the literal value of the `Authorization` header.
///
/// Implementations must be pure: the dispatcher calls this once per request.
pub trait Credential: Send + Sync {
    fn authorization_header(&self) -> String;
}

/// PAT-based credential.
///
/// The PAT is stored using `SecretString` and never shows up in `Debug` output.
///
/// # Example
///
/// ```rust
/// use vsts_client::api::{Credential, PatCredential};
///
/// let credential = PatCredential::from_string("pat".to_string());
/// assert_eq!(credential.authorization_header(), "Basic OnBhdA==");
/// ```
#[derive(Clone)]
pub struct PatCredential {
    pat: SecretString,
}

impl PatCredential {
    /// Creates a new PAT credential from a SecretString.
    pub fn new(pat: SecretString) -> Self {
        Self { pat }
    }

    /// Creates a new PAT credential from a plain string.
    pub fn from_string(pat: String) -> Self {
        Self {
            pat: SecretString::from(pat),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pat.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for PatCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredential")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}

impl Credential for PatCredential {
    fn authorization_header(&self) -> String {
        let encoded = STANDARD.encode(format!(":{}", self.pat.expose_secret()));
        format!("Basic {encoded}")
    }
}
