//! Bearer token types.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Renew this far ahead of the expiry the token endpoint reports.
const RENEW_MARGIN_SECONDS: i64 = 10 * 60;

/// A bearer token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub(crate) struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A cached token plus the moment it should be renewed.
///
/// The deadline sits `RENEW_MARGIN_SECONDS` before the reported expiry, so
/// a token is replaced while the old one is still accepted. A reported
/// lifetime shorter than the margin produces a deadline that has already
/// passed, which makes every access renew.
#[derive(Clone, Debug)]
pub(crate) struct TokenState {
    token: AccessToken,
    renew_after: DateTime<Utc>,
}

impl TokenState {
    /// Build from a token endpoint grant.
    pub(crate) fn new(token: AccessToken, expires_in_seconds: i64) -> Self {
        let renew_after = Utc::now() + Duration::seconds(expires_in_seconds - RENEW_MARGIN_SECONDS);
        Self { token, renew_after }
    }

    /// True once the renewal deadline has passed.
    pub(crate) fn needs_renewal(&self) -> bool {
        Utc::now() >= self.renew_after
    }

    /// Returns the `Authorization` header value.
    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn fresh_token_does_not_need_renewal() {
        let state = TokenState::new(AccessToken::new("tok"), 3600);
        assert!(!state.needs_renewal());
    }

    #[test]
    fn token_within_margin_needs_renewal() {
        let state = TokenState::new(AccessToken::new("tok"), RENEW_MARGIN_SECONDS);
        assert!(state.needs_renewal());
    }

    #[test]
    fn header_value_is_bearer() {
        let state = TokenState::new(AccessToken::new("tok123"), 3600);
        assert_eq!(state.header_value(), "Bearer tok123");
    }
}
