//! Sample storage and invocation for multi-label tags functions.
//!
//! Tags samples carry annotation lists instead of a single annotation, and
//! their endpoints live on the older API generation.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

use crate::error::{Error, InvalidInputError, TransientError};
use crate::functions::labels::LabelsApi;
use crate::functions::paths::FunctionPaths;
use crate::functions::samples::{is_model_not_ready, post_sample, resolve_label_name};
use crate::functions::types::{Prediction, TagAnnotation, TagsPrediction, TagsSample};
use crate::functions::wire::{
    InvokeBody, InvokePrediction, TagAnnotationBody, TagsSampleBody, TagsSampleEntry,
};
use crate::http::ApiClient;
use crate::types::ResourceId;

#[derive(Clone, Debug)]
pub(crate) struct TagsSamplesApi {
    client: ApiClient,
    paths: FunctionPaths,
    labels: LabelsApi,
}

impl TagsSamplesApi {
    pub(crate) fn new(client: ApiClient, paths: FunctionPaths) -> Self {
        let labels = LabelsApi::new(client.clone(), paths.clone());
        Self {
            client,
            paths,
            labels,
        }
    }

    /// Create samples concurrently, returning their ids in input order.
    ///
    /// Labels referenced by any annotation entry are created first if the
    /// function does not have them yet. Duplicates map to the existing
    /// sample's id.
    #[instrument(skip(self, samples), fields(function = %self.paths.function_id()))]
    pub(crate) async fn create_samples<D>(
        &self,
        samples: &[TagsSample<D>],
    ) -> crate::Result<Vec<ResourceId>>
    where
        D: Serialize + Sync,
    {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = samples
            .iter()
            .filter_map(|sample| sample.annotation.as_ref())
            .flatten()
            .map(|tag| tag.label_name.trim().to_string())
            .collect();
        names.sort();
        names.dedup();
        self.labels.create_missing(&names).await?;

        let path = self.paths.samples();
        // Eager future construction works around rust-lang/rust#102211.
        let requests: Vec<_> = samples
            .iter()
            .map(|sample| {
                let path = path.as_str();
                async move {
                    let body = TagsSampleBody {
                        data: &sample.data,
                        external_id: sample.external_id.as_deref(),
                        annotation: sample.annotation.as_ref().map(|tags| annotation_bodies(tags)),
                    };
                    post_sample(&self.client, path, &body).await
                }
            })
            .collect();
        let ids = stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect()
            .await?;
        debug!(count = samples.len(), "created samples");
        Ok(ids)
    }

    pub(crate) async fn list_samples<D>(&self) -> crate::Result<Vec<TagsSample<D>>>
    where
        D: DeserializeOwned,
    {
        let path = self.paths.samples_page(self.client.config().page_size);
        let entries: Vec<TagsSampleEntry<D>> = self.client.get_all(&path).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let names = self.labels.names_by_id().await?;
        entries
            .into_iter()
            .map(|entry| entry_to_sample(entry, &names))
            .collect()
    }

    /// Read one sample, retrying a 404 once for freshly created samples.
    pub(crate) async fn read_sample<D>(&self, sample_id: &ResourceId) -> crate::Result<TagsSample<D>>
    where
        D: DeserializeOwned,
    {
        let path = self.paths.sample(sample_id);
        let entry: TagsSampleEntry<D> = match self.client.get(&path).await {
            Err(Error::InvalidRequest(err)) if err.status == 404 => {
                debug!(sample = %sample_id, "sample not visible yet, retrying once");
                sleep(self.client.config().resource_poll_interval).await;
                self.client.get(&path).await?
            }
            other => other?,
        };
        let names = self.labels.names_by_id().await?;
        entry_to_sample(entry, &names)
    }

    /// Replace the annotation list of a stored sample.
    ///
    /// Unlike single-label samples there is no deletion shorthand: an
    /// absent tag is expressed inside the list, so the list itself is
    /// required.
    pub(crate) async fn update_annotation<D>(&self, sample: &TagsSample<D>) -> crate::Result<()> {
        let id = sample.id.as_ref().ok_or_else(|| InvalidInputError::Sample {
            reason: "missing id, create or read the sample first".to_string(),
        })?;
        let annotation = sample
            .annotation
            .as_ref()
            .ok_or_else(|| InvalidInputError::Sample {
                reason: "tags samples require an annotation list to update".to_string(),
            })?;
        let body = annotation_bodies(annotation);
        self.client
            .put_no_response(&self.paths.annotation(id), &body)
            .await
    }

    pub(crate) async fn delete_sample(&self, sample_id: &ResourceId) -> crate::Result<()> {
        self.client.delete(&self.paths.sample(sample_id)).await
    }

    pub(crate) async fn delete_samples(&self, sample_ids: &[ResourceId]) -> crate::Result<()> {
        if sample_ids.is_empty() {
            return Ok(());
        }
        // Eager future construction works around rust-lang/rust#102211.
        let requests: Vec<_> = sample_ids
            .iter()
            .map(|sample_id| {
                let path = self.paths.sample(sample_id);
                async move { self.client.delete(&path).await }
            })
            .collect();
        stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    /// Invoke the function's model on each input, in input order. Each
    /// input yields one prediction per tag the model considered.
    #[instrument(skip(self, data), fields(function = %self.paths.function_id()))]
    pub(crate) async fn invoke<D>(&self, data: &[D]) -> crate::Result<Vec<TagsPrediction>>
    where
        D: Serialize + Sync,
    {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let config = self.client.config();
        let started = Instant::now();
        loop {
            match self.try_invoke(data).await {
                Err(err) if is_model_not_ready(&err) => {
                    if started.elapsed() >= config.model_wait_timeout {
                        return Err(TransientError::ModelNotReady {
                            waited: started.elapsed(),
                        }
                        .into());
                    }
                    debug!("no model trained yet, waiting");
                    sleep(config.model_poll_interval).await;
                }
                other => return other,
            }
        }
    }

    async fn try_invoke<D>(&self, data: &[D]) -> crate::Result<Vec<TagsPrediction>>
    where
        D: Serialize + Sync,
    {
        let path = self.paths.invoke();
        // Eager future construction works around rust-lang/rust#102211.
        let requests: Vec<_> = data
            .iter()
            .map(|item| {
                let path = path.as_str();
                async move {
                    let response: Vec<InvokePrediction> =
                        self.client.post(path, &InvokeBody { data: item }).await?;
                    Ok::<_, Error>(
                        response
                            .into_iter()
                            .map(|prediction| Prediction {
                                label_name: prediction.label_name,
                                confidence: prediction.confidence,
                            })
                            .collect(),
                    )
                }
            })
            .collect();
        stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect()
            .await
    }
}

fn annotation_bodies(annotation: &[TagAnnotation]) -> Vec<TagAnnotationBody<'_>> {
    annotation
        .iter()
        .map(|tag| TagAnnotationBody {
            label_name: tag.label_name.trim(),
            present: tag.present,
        })
        .collect()
}

fn entry_to_sample<D>(
    entry: TagsSampleEntry<D>,
    names: &HashMap<ResourceId, String>,
) -> crate::Result<TagsSample<D>> {
    let annotation = entry
        .annotation
        .map(|tags| {
            tags.iter()
                .map(|tag| {
                    resolve_label_name(&tag.label_id, names).map(|label_name| TagAnnotation {
                        label_name,
                        present: tag.present,
                    })
                })
                .collect::<crate::Result<Vec<_>>>()
        })
        .transpose()?;
    let prediction = entry
        .prediction
        .map(|predictions| {
            predictions
                .iter()
                .map(|prediction| {
                    resolve_label_name(&prediction.label_id, names).map(|label_name| Prediction {
                        label_name,
                        confidence: prediction.confidence,
                    })
                })
                .collect::<crate::Result<Vec<_>>>()
        })
        .transpose()?;
    Ok(TagsSample {
        data: entry.data,
        id: Some(entry.id),
        external_id: entry.external_id,
        annotation,
        prediction,
    })
}
