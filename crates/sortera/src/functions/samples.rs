//! Sample storage and invocation for single-label functions.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

use crate::error::{Error, InvalidInputError, ProtocolError, TransientError};
use crate::functions::labels::LabelsApi;
use crate::functions::paths::FunctionPaths;
use crate::functions::types::{Annotation, Prediction, Sample};
use crate::functions::wire::{
    AnnotationBody, CreatedResource, DuplicateSample, InvokeBody, InvokePrediction, SampleBody,
    SampleEntry,
};
use crate::http::ApiClient;
use crate::types::ResourceId;

/// Body marker the service sends on invoke before a model exists.
pub(crate) const NO_MODEL_MARKER: &str = "No model available to invoke function";

/// True for the 400 the service answers with while no trained model exists.
pub(crate) fn is_model_not_ready(err: &Error) -> bool {
    matches!(err, Error::InvalidRequest(e) if e.body.contains(NO_MODEL_MARKER))
}

/// POST one sample body. A 409 answer is not a failure: its body carries
/// the id of the already existing duplicate, which is returned instead.
pub(crate) async fn post_sample<B>(
    client: &ApiClient,
    path: &str,
    body: &B,
) -> crate::Result<ResourceId>
where
    B: Serialize + ?Sized,
{
    match client.post::<B, CreatedResource>(path, body).await {
        Ok(created) => Ok(created.id),
        Err(Error::InvalidRequest(err)) if err.status == 409 => {
            let duplicate: DuplicateSample = serde_json::from_str(&err.body)
                .map_err(|e| ProtocolError::new(err.status, e.to_string()))?;
            Ok(duplicate.existing_sample_id)
        }
        Err(err) => Err(err),
    }
}

/// Resolve a label id the server returned to the label's name.
pub(crate) fn resolve_label_name(
    label_id: &ResourceId,
    names: &HashMap<ResourceId, String>,
) -> crate::Result<String> {
    names.get(label_id).cloned().ok_or_else(|| {
        ProtocolError::new(200, format!("sample references unknown label id '{label_id}'")).into()
    })
}

#[derive(Clone, Debug)]
pub(crate) struct SamplesApi {
    client: ApiClient,
    paths: FunctionPaths,
    labels: LabelsApi,
}

impl SamplesApi {
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
    /// Labels referenced by annotations are created first if the function
    /// does not have them yet. Duplicates map to the existing sample's id.
    #[instrument(skip(self, samples), fields(function = %self.paths.function_id()))]
    pub(crate) async fn create_samples<D>(
        &self,
        samples: &[Sample<D>],
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
            .map(|annotation| annotation.label_name.trim().to_string())
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
                    let body = SampleBody {
                        data: &sample.data,
                        external_id: sample.external_id.as_deref(),
                        annotation: sample.annotation.as_ref().map(|annotation| AnnotationBody {
                            label_name: annotation.label_name.trim(),
                        }),
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

    pub(crate) async fn list_samples<D>(&self) -> crate::Result<Vec<Sample<D>>>
    where
        D: DeserializeOwned,
    {
        let path = self.paths.samples_page(self.client.config().page_size);
        let entries: Vec<SampleEntry<D>> = self.client.get_all(&path).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let names = self.labels.names_by_id().await?;
        entries
            .into_iter()
            .map(|entry| entry_to_sample(entry, &names))
            .collect()
    }

    /// Read one sample. A fresh sample can 404 briefly after creation, so a
    /// single retry is taken after the poll interval.
    pub(crate) async fn read_sample<D>(&self, sample_id: &ResourceId) -> crate::Result<Sample<D>>
    where
        D: DeserializeOwned,
    {
        let path = self.paths.sample(sample_id);
        let entry: SampleEntry<D> = match self.client.get(&path).await {
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

    /// Set or clear the annotation of a stored sample.
    pub(crate) async fn update_annotation<D>(&self, sample: &Sample<D>) -> crate::Result<()> {
        let id = sample.id.as_ref().ok_or_else(|| InvalidInputError::Sample {
            reason: "missing id, create or read the sample first".to_string(),
        })?;
        let path = self.paths.annotation(id);
        match sample.annotation.as_ref() {
            Some(annotation) => {
                let body = AnnotationBody {
                    label_name: annotation.label_name.trim(),
                };
                self.client.put_no_response(&path, &body).await
            }
            None => self.client.delete(&path).await,
        }
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

    /// Invoke the function's model on each input, in input order.
    ///
    /// A newly trained function answers 400 with a "no model" marker until
    /// its first model is ready; that answer is polled through, bounded by
    /// the configured model wait timeout.
    #[instrument(skip(self, data), fields(function = %self.paths.function_id()))]
    pub(crate) async fn invoke<D>(&self, data: &[D]) -> crate::Result<Vec<Prediction>>
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

    async fn try_invoke<D>(&self, data: &[D]) -> crate::Result<Vec<Prediction>>
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
                    let response: InvokePrediction =
                        self.client.post(path, &InvokeBody { data: item }).await?;
                    Ok::<_, Error>(Prediction {
                        label_name: response.label_name,
                        confidence: response.confidence,
                    })
                }
            })
            .collect();
        stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect()
            .await
    }
}

fn entry_to_sample<D>(
    entry: SampleEntry<D>,
    names: &HashMap<ResourceId, String>,
) -> crate::Result<Sample<D>> {
    let annotation = entry
        .annotation
        .map(|annotation| resolve_label_name(&annotation.label_id, names).map(Annotation::new))
        .transpose()?;
    let prediction = entry
        .prediction
        .map(|prediction| {
            resolve_label_name(&prediction.label_id, names).map(|label_name| Prediction {
                label_name,
                confidence: prediction.confidence,
            })
        })
        .transpose()?;
    Ok(Sample {
        data: entry.data,
        id: Some(entry.id),
        external_id: entry.external_id,
        annotation,
        prediction,
    })
}
