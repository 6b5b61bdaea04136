//! Resource identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identifier for a server-side resource.
///
/// The service returns ids carrying a kind prefix (`function_epy5jl0b`,
/// `label_a2b4c6d8`) while endpoint paths address the same resource by the
/// bare id. This type strips a single `kind_` prefix on construction and
/// renders the bare id everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourceId(String);

/// Identifier of a classification function.
pub type FunctionId = ResourceId;

impl ResourceId {
    /// Create a resource id, stripping the server's kind prefix if present.
    ///
    /// Ids with zero or more than one underscore are taken as-is.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        let stripped = match raw.split_once('_') {
            Some((_, rest)) if !rest.contains('_') => rest,
            _ => raw,
        };
        Self(stripped.to_string())
    }

    /// Returns the bare id as used in endpoint paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for ResourceId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_kind_prefix() {
        assert_eq!(ResourceId::new("function_epy5jl0b").as_str(), "epy5jl0b");
        assert_eq!(ResourceId::new("label_a2b4c6d8").as_str(), "a2b4c6d8");
    }

    #[test]
    fn bare_id_unchanged() {
        assert_eq!(ResourceId::new("epy5jl0b").as_str(), "epy5jl0b");
    }

    #[test]
    fn multiple_underscores_unchanged() {
        assert_eq!(ResourceId::new("a_b_c").as_str(), "a_b_c");
    }

    #[test]
    fn deserializes_from_prefixed_string() {
        let id: ResourceId = serde_json::from_str("\"sample_98fa1c\"").unwrap();
        assert_eq!(id.as_str(), "98fa1c");
    }
}
