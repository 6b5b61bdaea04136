//! Request and response bodies for the function endpoints.
//!
//! These mirror the JSON the service speaks and stay out of the public API.
//! Request bodies borrow from the caller; response bodies own their data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::functions::types::{FieldType, Label};
use crate::types::{InputModality, OutputModality, ResourceId};

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateFunctionRequest<'a> {
    pub name: &'a str,
    pub input: InputModality,
    pub output: OutputModality,
}

/// Response to any resource creation: the assigned id.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedResource {
    pub id: ResourceId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionMeta {
    #[serde(default)]
    pub name: Option<String>,
    pub input: InputModality,
    pub output: OutputModality,
}

/// Training state, only served by the `v0.9` function endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct FunctionState {
    pub state: String,
}

// ============================================================================
// Labels
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LabelBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelEntry {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl From<LabelEntry> for Label {
    fn from(entry: LabelEntry) -> Self {
        Label {
            name: entry.name,
            id: Some(entry.id),
            description: entry.description,
            metadata: entry.metadata,
        }
    }
}

// ============================================================================
// Samples
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotationBody<'a> {
    pub label_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SampleBody<'a, D> {
    pub data: &'a D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotationBody<'a>>,
}

/// Annotations and predictions come back keyed by label id, not name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotationEntry {
    pub label_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PredictionEntry {
    pub label_id: ResourceId,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SampleEntry<D> {
    pub id: ResourceId,
    pub data: D,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub annotation: Option<AnnotationEntry>,
    #[serde(default)]
    pub prediction: Option<PredictionEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InvokeBody<'a, D> {
    pub data: &'a D,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvokePrediction {
    pub label_name: String,
    pub confidence: f64,
}

/// Body of the 409 answer to a duplicate sample creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DuplicateSample {
    pub existing_sample_id: ResourceId,
}

// ============================================================================
// Tags samples
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagAnnotationBody<'a> {
    pub label_name: &'a str,
    pub present: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagsSampleBody<'a, D> {
    pub data: &'a D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Vec<TagAnnotationBody<'a>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagAnnotationEntry {
    pub label_id: ResourceId,
    pub present: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagsSampleEntry<D> {
    pub id: ResourceId,
    pub data: D,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub annotation: Option<Vec<TagAnnotationEntry>>,
    #[serde(default)]
    pub prediction: Option<Vec<PredictionEntry>>,
}

// ============================================================================
// Tabular fields
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct FieldBody<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldEntry {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_body_omits_empty_parts() {
        let data = "inbox zero".to_string();
        let body = SampleBody {
            data: &data,
            external_id: None,
            annotation: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"data":"inbox zero"}"#
        );
    }

    #[test]
    fn sample_body_writes_annotation_by_name() {
        let data = "inbox zero".to_string();
        let body = SampleBody {
            data: &data,
            external_id: Some("s-1"),
            annotation: Some(AnnotationBody { label_name: "ham" }),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"data":"inbox zero","externalId":"s-1","annotation":{"labelName":"ham"}}"#
        );
    }

    #[test]
    fn tags_annotation_is_a_list_with_presence() {
        let data = "tune the bass".to_string();
        let body = TagsSampleBody {
            data: &data,
            external_id: None,
            annotation: Some(vec![
                TagAnnotationBody {
                    label_name: "music",
                    present: true,
                },
                TagAnnotationBody {
                    label_name: "sports",
                    present: false,
                },
            ]),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"data":"tune the bass","annotation":[{"labelName":"music","present":true},{"labelName":"sports","present":false}]}"#
        );
    }

    #[test]
    fn sample_entry_strips_resource_prefixes() {
        let entry: SampleEntry<String> = serde_json::from_str(
            r#"{
                "id": "sample_s1",
                "data": "hello",
                "annotation": {"labelId": "label_l1"},
                "prediction": {"labelId": "label_l2", "confidence": 0.86}
            }"#,
        )
        .unwrap();
        assert_eq!(entry.id.as_str(), "s1");
        assert_eq!(entry.annotation.unwrap().label_id.as_str(), "l1");
        let prediction = entry.prediction.unwrap();
        assert_eq!(prediction.label_id.as_str(), "l2");
        assert_eq!(prediction.confidence, 0.86);
    }

    #[test]
    fn field_body_serializes_type_keyword() {
        let body = FieldBody {
            name: "age",
            field_type: FieldType::Number,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"name":"age","type":"Number"}"#
        );
    }
}
