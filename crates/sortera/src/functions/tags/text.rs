use async_trait::async_trait;

use crate::functions::core::TagsCore;
use crate::functions::traits::TagsFunction;
use crate::functions::types::{FunctionMetrics, Label, TagsPrediction, TagsSample};
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, ResourceId};

/// A multi-label tags function over text samples.
///
/// ```no_run
/// use sortera::{ApiClient, Credentials, TagAnnotation, TagsFunction, TextTagsFunction};
///
/// # async fn run() -> sortera::Result<()> {
/// let client = ApiClient::new(Credentials::new("client-id", "client-secret"));
/// let function = TextTagsFunction::create(&client, "topics").await?;
/// let sample = sortera::TextTagsSample::from("the bass line carries the game soundtrack")
///     .with_annotation(vec![
///         TagAnnotation::new("music"),
///         TagAnnotation::new("gaming"),
///         TagAnnotation::absent("sports"),
///     ]);
/// function.create_samples(std::slice::from_ref(&sample)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TextTagsFunction {
    core: TagsCore,
}

#[async_trait]
impl TagsFunction for TextTagsFunction {
    type Data = String;

    async fn create(client: &ApiClient, name: &str) -> crate::Result<Self> {
        let core = TagsCore::create(client, name, InputModality::Text).await?;
        Ok(Self { core })
    }

    async fn load(client: &ApiClient, function_id: FunctionId) -> crate::Result<Self> {
        let core = TagsCore::load(client, function_id, InputModality::Text).await?;
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

    async fn invoke(&self, data: &[String]) -> crate::Result<Vec<TagsPrediction>> {
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
        samples: &[TagsSample<String>],
    ) -> crate::Result<Vec<ResourceId>> {
        self.core.samples.create_samples(samples).await
    }

    async fn list_samples(&self) -> crate::Result<Vec<TagsSample<String>>> {
        self.core.samples.list_samples().await
    }

    async fn read_sample(&self, sample_id: &ResourceId) -> crate::Result<TagsSample<String>> {
        self.core.samples.read_sample(sample_id).await
    }

    async fn update_annotation(&self, sample: &TagsSample<String>) -> crate::Result<()> {
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
