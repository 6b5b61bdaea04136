//! Domain types shared by the function variants.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::ResourceId;

/// A label a function can assign to samples.
///
/// Labels constructed locally have no `id`; labels read back from the
/// service carry one.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub id: Option<ResourceId>,
    pub description: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            description: None,
            metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Ground-truth label assignment for a classification sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub label_name: String,
}

impl Annotation {
    pub fn new(label_name: impl Into<String>) -> Self {
        Self {
            label_name: label_name.into(),
        }
    }
}

impl From<&str> for Annotation {
    fn from(label_name: &str) -> Self {
        Self::new(label_name)
    }
}

impl From<String> for Annotation {
    fn from(label_name: String) -> Self {
        Self::new(label_name)
    }
}

/// A model's label assignment with its confidence.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label_name: String,
    pub confidence: f64,
}

/// All predictions a tags function returns for one sample.
pub type TagsPrediction = Vec<Prediction>;

/// One entry of a tags annotation: a label marked present or absent.
#[derive(Clone, Debug, PartialEq)]
pub struct TagAnnotation {
    pub label_name: String,
    pub present: bool,
}

impl TagAnnotation {
    /// Annotate the label as present on the sample.
    pub fn new(label_name: impl Into<String>) -> Self {
        Self {
            label_name: label_name.into(),
            present: true,
        }
    }

    /// Annotate the label as explicitly absent from the sample.
    pub fn absent(label_name: impl Into<String>) -> Self {
        Self {
            label_name: label_name.into(),
            present: false,
        }
    }
}

/// A sample of a single-label classification function.
///
/// `D` is the variant's data representation. Locally constructed samples
/// have no `id` or `prediction`; both are filled in by the service.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<D> {
    pub data: D,
    pub id: Option<ResourceId>,
    pub external_id: Option<String>,
    pub annotation: Option<Annotation>,
    pub prediction: Option<Prediction>,
}

impl<D> Sample<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            id: None,
            external_id: None,
            annotation: None,
            prediction: None,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl From<&str> for Sample<String> {
    fn from(data: &str) -> Self {
        Self::new(data.to_string())
    }
}

impl From<String> for Sample<String> {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

/// A sample of a multi-label tags function.
#[derive(Clone, Debug, PartialEq)]
pub struct TagsSample<D> {
    pub data: D,
    pub id: Option<ResourceId>,
    pub external_id: Option<String>,
    pub annotation: Option<Vec<TagAnnotation>>,
    pub prediction: Option<TagsPrediction>,
}

impl<D> TagsSample<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            id: None,
            external_id: None,
            annotation: None,
            prediction: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Vec<TagAnnotation>) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl From<&str> for TagsSample<String> {
    fn from(data: &str) -> Self {
        Self::new(data.to_string())
    }
}

impl From<String> for TagsSample<String> {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

/// Image sample data: a URL or a data URI.
pub type ImageData = String;

/// Tabular sample data, keyed by field name.
pub type TabularData = HashMap<String, FieldValue>;

pub type TextSample = Sample<String>;
pub type ImageSample = Sample<ImageData>;
pub type TabularSample = Sample<TabularData>;

pub type TextTagsSample = TagsSample<String>;
pub type ImageTagsSample = TagsSample<ImageData>;
pub type TabularTagsSample = TagsSample<TabularData>;

/// One cell of a tabular sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// The type of a tabular field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Number,
    Text,
    Image,
}

/// Schema entry of a tabular function.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularField {
    pub name: String,
    pub field_type: FieldType,
    pub id: Option<ResourceId>,
}

impl TabularField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            id: None,
        }
    }
}

/// Counters the service keeps per function.
///
/// The label count maps key on label name. Single-label functions report
/// `annotated_label_counts`; tags functions report
/// `positive_annotated_label_counts` instead, so both default to empty.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetrics {
    pub sample_count: u64,
    pub prediction_count: u64,
    pub is_training: bool,
    #[serde(default)]
    pub annotated_label_counts: HashMap<String, u64>,
    #[serde(default)]
    pub positive_annotated_label_counts: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_builder() {
        let label = Label::new("spam").with_description("unsolicited mail");
        assert_eq!(label.name, "spam");
        assert_eq!(label.description.as_deref(), Some("unsolicited mail"));
        assert!(label.id.is_none());
    }

    #[test]
    fn text_sample_from_str() {
        let sample = TextSample::from("hello").with_annotation("greeting");
        assert_eq!(sample.data, "hello");
        assert_eq!(sample.annotation.unwrap().label_name, "greeting");
    }

    #[test]
    fn tag_annotation_presence() {
        assert!(TagAnnotation::new("music").present);
        assert!(!TagAnnotation::absent("music").present);
    }

    #[test]
    fn field_value_round_trips_untagged() {
        let text: FieldValue = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(text, FieldValue::Text("alice".to_string()));
        let number: FieldValue = serde_json::from_str("41.5").unwrap();
        assert_eq!(number, FieldValue::Number(41.5));
        assert_eq!(serde_json::to_string(&number).unwrap(), "41.5");
    }

    #[test]
    fn metrics_tolerate_missing_label_counts() {
        let metrics: FunctionMetrics = serde_json::from_str(
            r#"{"sampleCount": 4, "predictionCount": 4, "isTraining": false}"#,
        )
        .unwrap();
        assert_eq!(metrics.sample_count, 4);
        assert!(metrics.annotated_label_counts.is_empty());
    }
}
