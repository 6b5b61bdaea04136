//! Shared plumbing behind the function variants.
//!
//! Each variant wraps one of these cores and delegates; the cores bundle
//! the per-resource APIs for one function and carry the create and load
//! handshakes.

use crate::functions::fields::FieldsApi;
use crate::functions::info::{self, FunctionInfoApi};
use crate::functions::labels::LabelsApi;
use crate::functions::paths::FunctionPaths;
use crate::functions::samples::SamplesApi;
use crate::functions::tags_samples::TagsSamplesApi;
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, OutputModality};

#[derive(Clone, Debug)]
pub(crate) struct ClassificationCore {
    client: ApiClient,
    paths: FunctionPaths,
    pub(crate) info: FunctionInfoApi,
    pub(crate) labels: LabelsApi,
    pub(crate) samples: SamplesApi,
}

impl ClassificationCore {
    fn open(client: &ApiClient, function_id: FunctionId) -> Self {
        let paths = FunctionPaths::classification(function_id);
        Self {
            info: FunctionInfoApi::new(client.clone(), paths.clone()),
            labels: LabelsApi::new(client.clone(), paths.clone()),
            samples: SamplesApi::new(client.clone(), paths.clone()),
            client: client.clone(),
            paths,
        }
    }

    /// Register a new function and wait until it is addressable.
    pub(crate) async fn create(
        client: &ApiClient,
        name: &str,
        input: InputModality,
    ) -> crate::Result<Self> {
        let function_id =
            info::create_function(client, name, input, OutputModality::Classification).await?;
        let core = Self::open(client, function_id);
        core.info.wait_until_visible().await?;
        Ok(core)
    }

    /// Attach to an existing function after verifying its modalities.
    pub(crate) async fn load(
        client: &ApiClient,
        function_id: FunctionId,
        input: InputModality,
    ) -> crate::Result<Self> {
        let core = Self::open(client, function_id);
        core.info
            .ensure_matches(input, OutputModality::Classification)
            .await?;
        Ok(core)
    }

    pub(crate) fn function_id(&self) -> &FunctionId {
        self.paths.function_id()
    }

    pub(crate) fn train_page(&self) -> String {
        self.paths.train_page(self.client.server_url())
    }

    pub(crate) fn fields_api(&self) -> FieldsApi {
        FieldsApi::new(self.client.clone(), self.paths.clone())
    }

    pub(crate) async fn sample_count(&self) -> crate::Result<u64> {
        Ok(self.info.metrics().await?.sample_count)
    }

    pub(crate) async fn prediction_count(&self) -> crate::Result<u64> {
        Ok(self.info.metrics().await?.prediction_count)
    }

    pub(crate) async fn label_count(&self) -> crate::Result<u64> {
        Ok(self.info.metrics().await?.annotated_label_counts.len() as u64)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TagsCore {
    client: ApiClient,
    paths: FunctionPaths,
    pub(crate) info: FunctionInfoApi,
    pub(crate) labels: LabelsApi,
    pub(crate) samples: TagsSamplesApi,
}

impl TagsCore {
    fn open(client: &ApiClient, function_id: FunctionId) -> Self {
        let paths = FunctionPaths::tags(function_id);
        Self {
            info: FunctionInfoApi::new(client.clone(), paths.clone()),
            labels: LabelsApi::new(client.clone(), paths.clone()),
            samples: TagsSamplesApi::new(client.clone(), paths.clone()),
            client: client.clone(),
            paths,
        }
    }

    pub(crate) async fn create(
        client: &ApiClient,
        name: &str,
        input: InputModality,
    ) -> crate::Result<Self> {
        let function_id =
            info::create_function(client, name, input, OutputModality::Tags).await?;
        let core = Self::open(client, function_id);
        core.info.wait_until_visible().await?;
        Ok(core)
    }

    pub(crate) async fn load(
        client: &ApiClient,
        function_id: FunctionId,
        input: InputModality,
    ) -> crate::Result<Self> {
        let core = Self::open(client, function_id);
        core.info
            .ensure_matches(input, OutputModality::Tags)
            .await?;
        Ok(core)
    }

    pub(crate) fn function_id(&self) -> &FunctionId {
        self.paths.function_id()
    }

    pub(crate) fn train_page(&self) -> String {
        self.paths.train_page(self.client.server_url())
    }

    pub(crate) fn fields_api(&self) -> FieldsApi {
        FieldsApi::new(self.client.clone(), self.paths.clone())
    }

    pub(crate) async fn sample_count(&self) -> crate::Result<u64> {
        Ok(self.info.metrics().await?.sample_count)
    }

    pub(crate) async fn prediction_count(&self) -> crate::Result<u64> {
        Ok(self.info.metrics().await?.prediction_count)
    }

    /// Tags functions report their label counts under the positive map.
    pub(crate) async fn label_count(&self) -> crate::Result<u64> {
        Ok(self
            .info
            .metrics()
            .await?
            .positive_annotated_label_counts
            .len() as u64)
    }
}
