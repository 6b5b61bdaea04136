//! Function modality types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of input a function accepts.
///
/// Serialized exactly as the service spells it (`"Text"`, `"Image"`,
/// `"Tabular"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputModality {
    Text,
    Image,
    Tabular,
}

/// What kind of output a function produces.
///
/// `Classification` assigns a single label per sample; `Tags` assigns any
/// number of labels, each with a presence flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputModality {
    Classification,
    Tags,
}

impl fmt::Display for InputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputModality::Text => "Text",
            InputModality::Image => "Image",
            InputModality::Tabular => "Tabular",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for OutputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputModality::Classification => "Classification",
            OutputModality::Tags => "Tags",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_service_strings() {
        assert_eq!(serde_json::to_string(&InputModality::Text).unwrap(), "\"Text\"");
        assert_eq!(
            serde_json::to_string(&OutputModality::Classification).unwrap(),
            "\"Classification\""
        );
    }

    #[test]
    fn deserializes_from_service_strings() {
        let input: InputModality = serde_json::from_str("\"Tabular\"").unwrap();
        assert_eq!(input, InputModality::Tabular);
        let output: OutputModality = serde_json::from_str("\"Tags\"").unwrap();
        assert_eq!(output, OutputModality::Tags);
    }
}
