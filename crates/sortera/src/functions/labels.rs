//! Label management, shared by every function variant.

use std::collections::{HashMap, HashSet};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

use crate::error::{InvalidInputError, TransientError};
use crate::functions::paths::FunctionPaths;
use crate::functions::types::Label;
use crate::functions::wire::{CreatedResource, LabelBody, LabelEntry};
use crate::http::ApiClient;
use crate::types::ResourceId;

#[derive(Clone, Debug)]
pub(crate) struct LabelsApi {
    client: ApiClient,
    paths: FunctionPaths,
}

impl LabelsApi {
    pub(crate) fn new(client: ApiClient, paths: FunctionPaths) -> Self {
        Self { client, paths }
    }

    /// Create labels concurrently, returning their ids in input order.
    ///
    /// Waits until every new label shows up in the listing, since the
    /// service creates them asynchronously and samples annotated with a
    /// label that is not yet visible would be rejected.
    #[instrument(skip(self, labels), fields(function = %self.paths.function_id()))]
    pub(crate) async fn create_labels(&self, labels: &[Label]) -> crate::Result<Vec<ResourceId>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }
        let path = self.paths.labels();
        // Futures are built eagerly: a closure returning an async block over
        // a reference item cannot be proven Send through the boxed trait
        // futures (rust-lang/rust#102211).
        let requests: Vec<_> = labels
            .iter()
            .map(|label| {
                let path = path.as_str();
                async move {
                    let body = LabelBody {
                        name: label.name.trim(),
                        description: label.description.as_deref(),
                        metadata: label.metadata.as_ref(),
                    };
                    let created: CreatedResource = self.client.post(path, &body).await?;
                    Ok::<_, crate::Error>(created.id)
                }
            })
            .collect();
        let ids: Vec<ResourceId> = stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect()
            .await?;
        debug!(count = ids.len(), "created labels");

        let names: Vec<String> = labels
            .iter()
            .map(|label| label.name.trim().to_string())
            .collect();
        self.wait_until_listed(&names).await?;
        Ok(ids)
    }

    /// Create any of `names` that the function does not have yet.
    pub(crate) async fn create_missing(&self, names: &[String]) -> crate::Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let existing: HashSet<String> = self
            .list_labels()
            .await?
            .into_iter()
            .map(|label| label.name)
            .collect();
        let missing: Vec<Label> = names
            .iter()
            .filter(|name| !existing.contains(*name))
            .map(|name| Label::new(name.clone()))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        debug!(count = missing.len(), "creating labels referenced by samples");
        self.create_labels(&missing).await?;
        Ok(())
    }

    pub(crate) async fn list_labels(&self) -> crate::Result<Vec<Label>> {
        let path = self.paths.labels_page(self.client.config().page_size);
        let entries: Vec<LabelEntry> = self.client.get_all(&path).await?;
        Ok(entries.into_iter().map(Label::from).collect())
    }

    pub(crate) async fn read_label(&self, label_id: &ResourceId) -> crate::Result<Label> {
        let entry: LabelEntry = self.client.get(&self.paths.label(label_id)).await?;
        Ok(entry.into())
    }

    /// Replace a label's name, description, and metadata.
    pub(crate) async fn update_label(&self, label: &Label) -> crate::Result<Label> {
        let id = label.id.as_ref().ok_or_else(|| InvalidInputError::Label {
            value: label.name.clone(),
            reason: "missing id, create or read the label first".to_string(),
        })?;
        let body = LabelBody {
            name: label.name.trim(),
            description: label.description.as_deref(),
            metadata: label.metadata.as_ref(),
        };
        let entry: LabelEntry = self.client.put(&self.paths.label(id), &body).await?;
        Ok(entry.into())
    }

    pub(crate) async fn delete_label(&self, label_id: &ResourceId) -> crate::Result<()> {
        self.client.delete(&self.paths.label(label_id)).await
    }

    pub(crate) async fn delete_labels(&self, label_ids: &[ResourceId]) -> crate::Result<()> {
        if label_ids.is_empty() {
            return Ok(());
        }
        let requests: Vec<_> = label_ids
            .iter()
            .map(|label_id| {
                let path = self.paths.label(label_id);
                async move { self.client.delete(&path).await }
            })
            .collect();
        stream::iter(requests)
            .buffered(self.client.config().max_concurrent_requests)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    /// Lookup table from label id to label name, for resolving the ids the
    /// sample endpoints return.
    pub(crate) async fn names_by_id(&self) -> crate::Result<HashMap<ResourceId, String>> {
        let labels = self.list_labels().await?;
        Ok(labels
            .into_iter()
            .filter_map(|label| label.id.map(|id| (id, label.name)))
            .collect())
    }

    async fn wait_until_listed(&self, names: &[String]) -> crate::Result<()> {
        let config = self.client.config();
        let deadline = Instant::now() + config.resource_wait_timeout;
        loop {
            let listed: HashSet<String> = self
                .list_labels()
                .await?
                .into_iter()
                .map(|label| label.name)
                .collect();
            if names.iter().all(|name| listed.contains(name)) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(TransientError::ResourceUnavailable {
                    what: "labels".to_string(),
                    waited: config.resource_wait_timeout,
                }
                .into());
            }
            debug!("labels not listed yet, polling");
            sleep(config.resource_poll_interval).await;
        }
    }
}
