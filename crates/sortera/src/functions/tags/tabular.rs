use async_trait::async_trait;

use crate::functions::core::TagsCore;
use crate::functions::fields::FieldsApi;
use crate::functions::traits::TagsFunction;
use crate::functions::types::{
    FunctionMetrics, Label, TabularData, TabularField, TagsPrediction, TagsSample,
};
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, ResourceId};

/// A multi-label tags function over tabular samples.
///
/// Carries a field schema like its single-label counterpart: fields must
/// be created before samples referencing them, and payloads are rewritten
/// between field names and the service's field ids.
#[derive(Clone, Debug)]
pub struct TabularTagsFunction {
    core: TagsCore,
    fields: FieldsApi,
}

impl TabularTagsFunction {
    /// Create schema fields, returning their ids in input order.
    pub async fn create_fields(&self, fields: &[TabularField]) -> crate::Result<Vec<ResourceId>> {
        self.fields.create_fields(fields).await
    }

    pub async fn list_fields(&self) -> crate::Result<Vec<TabularField>> {
        self.fields.list_fields().await
    }

    pub async fn read_field(&self, field_id: &ResourceId) -> crate::Result<TabularField> {
        self.fields.read_field(field_id).await
    }

    pub async fn delete_field(&self, field_id: &ResourceId) -> crate::Result<()> {
        self.fields.delete_field(field_id).await
    }
}

#[async_trait]
impl TagsFunction for TabularTagsFunction {
    type Data = TabularData;

    async fn create(client: &ApiClient, name: &str) -> crate::Result<Self> {
        let core = TagsCore::create(client, name, InputModality::Tabular).await?;
        let fields = core.fields_api();
        Ok(Self { core, fields })
    }

    async fn load(client: &ApiClient, function_id: FunctionId) -> crate::Result<Self> {
        let core = TagsCore::load(client, function_id, InputModality::Tabular).await?;
        let fields = core.fields_api();
        Ok(Self { core, fields })
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

    async fn invoke(&self, data: &[TabularData]) -> crate::Result<Vec<TagsPrediction>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let ids_by_name = self.fields.ids_by_name().await?;
        let converted: Vec<TabularData> = data
            .iter()
            .map(|row| self.fields.to_wire(row, &ids_by_name))
            .collect::<crate::Result<_>>()?;
        self.core.samples.invoke(&converted).await
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
        samples: &[TagsSample<TabularData>],
    ) -> crate::Result<Vec<ResourceId>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let ids_by_name = self.fields.ids_by_name().await?;
        let converted: Vec<TagsSample<TabularData>> = samples
            .iter()
            .map(|sample| {
                Ok(TagsSample {
                    data: self.fields.to_wire(&sample.data, &ids_by_name)?,
                    id: sample.id.clone(),
                    external_id: sample.external_id.clone(),
                    annotation: sample.annotation.clone(),
                    prediction: sample.prediction.clone(),
                })
            })
            .collect::<crate::Result<_>>()?;
        self.core.samples.create_samples(&converted).await
    }

    async fn list_samples(&self) -> crate::Result<Vec<TagsSample<TabularData>>> {
        let samples = self.core.samples.list_samples::<TabularData>().await?;
        if samples.is_empty() {
            return Ok(samples);
        }
        let names_by_id = self.fields.names_by_id().await?;
        samples
            .into_iter()
            .map(|mut sample| {
                let data = std::mem::take(&mut sample.data);
                sample.data = self.fields.from_wire(data, &names_by_id)?;
                Ok(sample)
            })
            .collect()
    }

    async fn read_sample(&self, sample_id: &ResourceId) -> crate::Result<TagsSample<TabularData>> {
        let mut sample = self
            .core
            .samples
            .read_sample::<TabularData>(sample_id)
            .await?;
        let names_by_id = self.fields.names_by_id().await?;
        let data = std::mem::take(&mut sample.data);
        sample.data = self.fields.from_wire(data, &names_by_id)?;
        Ok(sample)
    }

    async fn update_annotation(&self, sample: &TagsSample<TabularData>) -> crate::Result<()> {
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
