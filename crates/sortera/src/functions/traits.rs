//! The operation surface shared by the function variants.

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::functions::types::{
    FunctionMetrics, Label, Prediction, Sample, TagsPrediction, TagsSample,
};
use crate::http::ApiClient;
use crate::types::{FunctionId, ResourceId};

/// A single-label classification function.
///
/// Implemented by the text, image, and tabular variants, which differ only
/// in their sample data representation. Nothing is cached between calls;
/// every operation talks to the service.
#[async_trait]
pub trait ClassificationFunction: Send + Sync + Sized {
    /// The sample data representation this variant accepts.
    type Data: Send + Sync;

    /// Register a new function under `name` and return a wrapper for it.
    async fn create(client: &ApiClient, name: &str) -> crate::Result<Self>;

    /// Attach to an existing function, verifying its modalities match this
    /// variant.
    async fn load(client: &ApiClient, function_id: FunctionId) -> crate::Result<Self>;

    fn function_id(&self) -> &FunctionId;

    /// Browser URL of the function's training console page.
    fn train_page(&self) -> String;

    async fn name(&self) -> crate::Result<String>;

    async fn metrics(&self) -> crate::Result<FunctionMetrics>;

    async fn sample_count(&self) -> crate::Result<u64>;

    /// How many samples the current model has scored.
    async fn prediction_count(&self) -> crate::Result<u64>;

    async fn label_count(&self) -> crate::Result<u64>;

    /// Whether a model trained on the full sample set is serving.
    async fn has_trained_model(&self) -> crate::Result<bool>;

    /// Invoke the model on each input, returning predictions in input
    /// order. Blocks (bounded) while the first model is still training.
    async fn invoke(&self, data: &[Self::Data]) -> crate::Result<Vec<Prediction>>;

    /// Invoke the model on a single input.
    async fn invoke_one(&self, data: &Self::Data) -> crate::Result<Prediction> {
        let mut predictions = self.invoke(std::slice::from_ref(data)).await?;
        predictions.pop().ok_or_else(|| {
            ProtocolError::new(200, "invoke returned no prediction for a single input").into()
        })
    }

    async fn create_labels(&self, labels: &[Label]) -> crate::Result<Vec<ResourceId>>;

    async fn list_labels(&self) -> crate::Result<Vec<Label>>;

    async fn read_label(&self, label_id: &ResourceId) -> crate::Result<Label>;

    /// Replace a label's name, description, and metadata. The label must
    /// carry the id of the label to update.
    async fn update_label(&self, label: &Label) -> crate::Result<Label>;

    async fn delete_label(&self, label_id: &ResourceId) -> crate::Result<()>;

    async fn delete_labels(&self, label_ids: &[ResourceId]) -> crate::Result<()>;

    /// Create samples, returning their ids in input order. Labels
    /// referenced by annotations are created as needed; a duplicate sample
    /// maps to the existing sample's id.
    async fn create_samples(&self, samples: &[Sample<Self::Data>]) -> crate::Result<Vec<ResourceId>>;

    async fn list_samples(&self) -> crate::Result<Vec<Sample<Self::Data>>>;

    async fn read_sample(&self, sample_id: &ResourceId) -> crate::Result<Sample<Self::Data>>;

    /// Set or clear the annotation of a stored sample. The sample must
    /// carry an id; a `None` annotation deletes the stored one.
    async fn update_annotation(&self, sample: &Sample<Self::Data>) -> crate::Result<()>;

    async fn delete_sample(&self, sample_id: &ResourceId) -> crate::Result<()>;

    async fn delete_samples(&self, sample_ids: &[ResourceId]) -> crate::Result<()>;

    /// Delete the function on the service, consuming the wrapper.
    async fn delete(self) -> crate::Result<()>;
}

/// A multi-label tags function.
///
/// Tags functions annotate each sample with a set of labels marked present
/// or absent, and every invocation returns one prediction per label.
#[async_trait]
pub trait TagsFunction: Send + Sync + Sized {
    /// The sample data representation this variant accepts.
    type Data: Send + Sync;

    /// Register a new function under `name` and return a wrapper for it.
    async fn create(client: &ApiClient, name: &str) -> crate::Result<Self>;

    /// Attach to an existing function, verifying its modalities match this
    /// variant.
    async fn load(client: &ApiClient, function_id: FunctionId) -> crate::Result<Self>;

    fn function_id(&self) -> &FunctionId;

    /// Browser URL of the function's training console page.
    fn train_page(&self) -> String;

    async fn name(&self) -> crate::Result<String>;

    async fn metrics(&self) -> crate::Result<FunctionMetrics>;

    async fn sample_count(&self) -> crate::Result<u64>;

    /// How many samples the current model has scored.
    async fn prediction_count(&self) -> crate::Result<u64>;

    async fn label_count(&self) -> crate::Result<u64>;

    /// Whether a model trained on the full sample set is serving.
    async fn has_trained_model(&self) -> crate::Result<bool>;

    /// Invoke the model on each input, returning one prediction list per
    /// input, in input order.
    async fn invoke(&self, data: &[Self::Data]) -> crate::Result<Vec<TagsPrediction>>;

    /// Invoke the model on a single input.
    async fn invoke_one(&self, data: &Self::Data) -> crate::Result<TagsPrediction> {
        let mut predictions = self.invoke(std::slice::from_ref(data)).await?;
        predictions.pop().ok_or_else(|| {
            ProtocolError::new(200, "invoke returned no prediction for a single input").into()
        })
    }

    async fn create_labels(&self, labels: &[Label]) -> crate::Result<Vec<ResourceId>>;

    async fn list_labels(&self) -> crate::Result<Vec<Label>>;

    async fn read_label(&self, label_id: &ResourceId) -> crate::Result<Label>;

    /// Replace a label's name, description, and metadata. The label must
    /// carry the id of the label to update.
    async fn update_label(&self, label: &Label) -> crate::Result<Label>;

    async fn delete_label(&self, label_id: &ResourceId) -> crate::Result<()>;

    async fn delete_labels(&self, label_ids: &[ResourceId]) -> crate::Result<()>;

    /// Create samples, returning their ids in input order. Labels
    /// referenced by annotation entries are created as needed; a duplicate
    /// sample maps to the existing sample's id.
    async fn create_samples(
        &self,
        samples: &[TagsSample<Self::Data>],
    ) -> crate::Result<Vec<ResourceId>>;

    async fn list_samples(&self) -> crate::Result<Vec<TagsSample<Self::Data>>>;

    async fn read_sample(&self, sample_id: &ResourceId) -> crate::Result<TagsSample<Self::Data>>;

    /// Replace the annotation list of a stored sample. The sample must
    /// carry an id and an annotation list.
    async fn update_annotation(&self, sample: &TagsSample<Self::Data>) -> crate::Result<()>;

    async fn delete_sample(&self, sample_id: &ResourceId) -> crate::Result<()>;

    async fn delete_samples(&self, sample_ids: &[ResourceId]) -> crate::Result<()>;

    /// Delete the function on the service, consuming the wrapper.
    async fn delete(self) -> crate::Result<()>;
}
