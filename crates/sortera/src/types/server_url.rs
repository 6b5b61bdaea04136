//! Server URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the classification service.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for localhost),
/// and is normalized so endpoint paths can be appended directly.
///
/// # Example
///
/// ```
/// use sortera::ServerUrl;
///
/// let server = ServerUrl::new("https://www.sortera.dev").unwrap();
/// assert_eq!(server.url_for("v1/functions"),
///            "https://www.sortera.dev/v1/functions");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerUrl(Url);

impl ServerUrl {
    /// Create a new server URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ServerUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the absolute URL for a path relative to the server root.
    ///
    /// Accepts paths with or without a leading slash; pagination next-links
    /// arrive from the server in either form.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.as_str(), path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string, without a trailing slash.
    ///
    /// The URL crate always serializes a root path as `/`, so the slash is
    /// trimmed here to keep appended paths single-slashed.
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        // Must be absolute
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        // Must be HTTPS (or HTTP for localhost)
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "::1");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        // Must have a host
        if url.host_str().is_none() {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServerUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServerUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServerUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServerUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServerUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let server = ServerUrl::new("https://www.sortera.dev").unwrap();
        assert_eq!(server.host(), Some("www.sortera.dev"));
    }

    #[test]
    fn valid_localhost_http() {
        let server = ServerUrl::new("http://localhost:5000").unwrap();
        assert_eq!(server.host(), Some("localhost"));
    }

    #[test]
    fn url_construction() {
        let server = ServerUrl::new("https://www.sortera.dev").unwrap();
        assert_eq!(
            server.url_for("v1/functions/abc123/samples"),
            "https://www.sortera.dev/v1/functions/abc123/samples"
        );
    }

    #[test]
    fn url_construction_with_leading_slash() {
        let server = ServerUrl::new("https://www.sortera.dev").unwrap();
        assert_eq!(
            server.url_for("/v1/functions?batchSize=10"),
            "https://www.sortera.dev/v1/functions?batchSize=10"
        );
    }

    #[test]
    fn normalizes_trailing_slash() {
        let server = ServerUrl::new("https://www.sortera.dev/").unwrap();
        assert_eq!(server.as_str(), "https://www.sortera.dev");
        assert_eq!(
            server.url_for("connect/token"),
            "https://www.sortera.dev/connect/token"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ServerUrl::new("http://www.sortera.dev").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ServerUrl::new("/v1/functions").is_err());
    }
}
