use async_trait::async_trait;

use crate::functions::core::ClassificationCore;
use crate::functions::traits::ClassificationFunction;
use crate::functions::types::{FunctionMetrics, ImageData, Label, Prediction, Sample};
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, ResourceId};

/// A single-label classification function over image samples.
///
/// Image data is passed by reference: either a URL the service can fetch
/// or a `data:` URI carrying the encoded image inline.
#[derive(Clone)]
pub struct ImageClassificationFunction {
    core: ClassificationCore,
}

#[async_trait]
impl ClassificationFunction for ImageClassificationFunction {
    type Data = ImageData;

    async fn create(client: &ApiClient, name: &str) -> crate::Result<Self> {
        let core = ClassificationCore::create(client, name, InputModality::Image).await?;
        Ok(Self { core })
    }

    async fn load(client: &ApiClient, function_id: FunctionId) -> crate::Result<Self> {
        let core = ClassificationCore::load(client, function_id, InputModality::Image).await?;
        Ok(Self { core })
    }

    fn function_id(&self) -> &FunctionId {
        self.core.function_id()
    }

    fn train_page(&self) -> String {
        self.core.train_page()
    }

    async fn name(&self) -> crate::Result<String> {
        self.core.info.name().await
    }

    async fn metrics(&self) -> crate::Result<FunctionMetrics> {
        self.core.info.metrics().await
    }

    async fn sample_count(&self) -> crate::Result<u64> {
        self.core.sample_count().await
    }

    async fn prediction_count(&self) -> crate::Result<u64> {
        self.core.prediction_count().await
    }

    async fn label_count(&self) -> crate::Result<u64> {
        self.core.label_count().await
    }

    async fn has_trained_model(&self) -> crate::Result<bool> {
        self.core.info.has_trained_model().await
    }

    async fn invoke(&self, data: &[ImageData]) -> crate::Result<Vec<Prediction>> {
        self.core.samples.invoke(data).await
    }

    async fn create_labels(&self, labels: &[Label]) -> crate::Result<Vec<ResourceId>> {
        self.core.labels.create_labels(labels).await
    }

    async fn list_labels(&self) -> crate::Result<Vec<Label>> {
        self.core.labels.list_labels().await
    }

    async fn read_label(&self, label_id: &ResourceId) -> crate::Result<Label> {
        self.core.labels.read_label(label_id).await
    }

    async fn update_label(&self, label: &Label) -> crate::Result<Label> {
        self.core.labels.update_label(label).await
    }

    async fn delete_label(&self, label_id: &ResourceId) -> crate::Result<()> {
        self.core.labels.delete_label(label_id).await
    }

    async fn delete_labels(&self, label_ids: &[ResourceId]) -> crate::Result<()> {
        self.core.labels.delete_labels(label_ids).await
    }

    async fn create_samples(
        &self,
        samples: &[Sample<ImageData>],
    ) -> crate::Result<Vec<ResourceId>> {
        self.core.samples.create_samples(samples).await
    }

    async fn list_samples(&self) -> crate::Result<Vec<Sample<ImageData>>> {
        self.core.samples.list_samples().await
    }

    async fn read_sample(&self, sample_id: &ResourceId) -> crate::Result<Sample<ImageData>> {
        self.core.samples.read_sample(sample_id).await
    }

    async fn update_annotation(&self, sample: &Sample<ImageData>) -> crate::Result<()> {
        self.core.samples.update_annotation(sample).await
    }

    async fn delete_sample(&self, sample_id: &ResourceId) -> crate::Result<()> {
        self.core.samples.delete_sample(sample_id).await
    }

    async fn delete_samples(&self, sample_ids: &[ResourceId]) -> crate::Result<()> {
        self.core.samples.delete_samples(sample_ids).await
    }

    async fn delete(self) -> crate::Result<()> {
        self.core.info.delete_function().await
    }
}
