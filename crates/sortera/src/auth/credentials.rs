//! Client credentials type.

use std::fmt;

use crate::error::Error;
use crate::types::ServerUrl;

/// The production service URL used when none is given.
pub const DEFAULT_SERVER_URL: &str = "https://www.sortera.dev";

/// Credentials for the classification service.
///
/// This type holds the client id and secret issued by the service console,
/// together with the server URL the client talks to.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use sortera::Credentials;
///
/// let creds = Credentials::new("my-client-id", "my-client-secret");
/// assert_eq!(creds.client_id(), "my-client-id");
/// ```
pub struct Credentials {
    client_id: String,
    client_secret: String,
    server_url: ServerUrl,
}

impl Credentials {
    /// Create credentials against the production server.
    ///
    /// # Arguments
    ///
    /// * `client_id` - The client id from the service console
    /// * `client_secret` - The matching client secret
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let server_url = ServerUrl::new(DEFAULT_SERVER_URL).expect("default server URL is valid");

        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            server_url,
        }
    }

    /// Create credentials against a specific server.
    ///
    /// # Errors
    ///
    /// Returns an error if `server_url` is not a valid absolute HTTPS URL
    /// (HTTP is allowed only for localhost).
    pub fn with_server_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        server_url: impl AsRef<str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            server_url: ServerUrl::new(server_url)?,
        })
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    ///
    /// # Security
    ///
    /// Use this only when constructing token renewal requests.
    /// Never log or display this value.
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the server URL these credentials are scoped to.
    pub fn server_url(&self) -> &ServerUrl {
        &self.server_url
    }
}

// Intentionally hide the secret in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("server_url", &self.server_url)
            .finish()
    }
}

// Clone allows credentials to be reused; the type is not Copy so that
// credential passing stays explicit.
impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            server_url: self.server_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_secret_in_debug() {
        let creds = Credentials::new("client-id-123", "secret456");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("client-id-123"));
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn defaults_to_production_server() {
        let creds = Credentials::new("id", "secret");
        assert_eq!(creds.server_url().as_str(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn custom_server_url() {
        let creds = Credentials::with_server_url("id", "secret", "http://localhost:5000").unwrap();
        assert_eq!(creds.server_url().host(), Some("localhost"));
    }

    #[test]
    fn rejects_invalid_server_url() {
        assert!(Credentials::with_server_url("id", "secret", "not a url").is_err());
    }
}
