//! Tabular field schema management and field name resolution.
//!
//! The service addresses tabular data by field id while callers work with
//! field names, so sample and invoke payloads are rewritten in both
//! directions here.

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

use crate::error::{InvalidInputError, ProtocolError, TransientError};
use crate::functions::paths::FunctionPaths;
use crate::functions::types::{TabularData, TabularField};
use crate::functions::wire::{CreatedResource, FieldBody, FieldEntry};
use crate::http::ApiClient;
use crate::types::ResourceId;

#[derive(Clone, Debug)]
pub(crate) struct FieldsApi {
    client: ApiClient,
    paths: FunctionPaths,
}

impl FieldsApi {
    pub(crate) fn new(client: ApiClient, paths: FunctionPaths) -> Self {
        Self { client, paths }
    }

    /// Create fields concurrently, returning their ids in input order, and
    /// wait until every new field shows up in the listing.
    #[instrument(skip(self, fields), fields(function = %self.paths.function_id()))]
    pub(crate) async fn create_fields(
        &self,
        fields: &[TabularField],
    ) -> crate::Result<Vec<ResourceId>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let path = self.paths.fields();
        // Eager future construction works around rust-lang/rust#102211.
        let requests: Vec<_> = fields
            .iter()
            .map(|field| {
                let path = path.as_str();
                async move {
                    let body = FieldBody {
                        name: &field.name,
                        field_type: field.field_type,
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
        debug!(count = ids.len(), "created fields");

        let names: Vec<&str> = fields.iter().map(|field| field.name.as_str()).collect();
        self.wait_until_listed(&names).await?;
        Ok(ids)
    }

    pub(crate) async fn list_fields(&self) -> crate::Result<Vec<TabularField>> {
        let path = self.paths.fields_page(self.client.config().page_size);
        let entries: Vec<FieldEntry> = self.client.get_all(&path).await?;
        Ok(entries.into_iter().map(entry_to_field).collect())
    }

    pub(crate) async fn read_field(&self, field_id: &ResourceId) -> crate::Result<TabularField> {
        let entry: FieldEntry = self.client.get(&self.paths.field(field_id)).await?;
        Ok(entry_to_field(entry))
    }

    pub(crate) async fn delete_field(&self, field_id: &ResourceId) -> crate::Result<()> {
        self.client.delete(&self.paths.field(field_id)).await
    }

    pub(crate) async fn ids_by_name(&self) -> crate::Result<HashMap<String, ResourceId>> {
        let fields = self.list_fields().await?;
        Ok(fields
            .into_iter()
            .filter_map(|field| field.id.map(|id| (field.name, id)))
            .collect())
    }

    pub(crate) async fn names_by_id(&self) -> crate::Result<HashMap<ResourceId, String>> {
        let fields = self.list_fields().await?;
        Ok(fields
            .into_iter()
            .filter_map(|field| field.id.map(|id| (id, field.name)))
            .collect())
    }

    /// Rewrite caller data keyed by field name into wire data keyed by
    /// field id. A name without a created field is an input error.
    pub(crate) fn to_wire(
        &self,
        data: &TabularData,
        ids_by_name: &HashMap<String, ResourceId>,
    ) -> crate::Result<TabularData> {
        data.iter()
            .map(|(name, value)| match ids_by_name.get(name) {
                Some(id) => Ok((id.to_string(), value.clone())),
                None => Err(InvalidInputError::Field {
                    value: name.clone(),
                    reason: format!(
                        "no such field on function '{}', create it first",
                        self.paths.function_id()
                    ),
                }
                .into()),
            })
            .collect()
    }

    /// Rewrite wire data keyed by field id back into data keyed by field
    /// name. An id without a known field means the listing and the sample
    /// disagree, which is a server-side inconsistency.
    pub(crate) fn from_wire(
        &self,
        data: TabularData,
        names_by_id: &HashMap<ResourceId, String>,
    ) -> crate::Result<TabularData> {
        data.into_iter()
            .map(|(key, value)| {
                let id = ResourceId::new(&key);
                match names_by_id.get(&id) {
                    Some(name) => Ok((name.clone(), value)),
                    None => Err(ProtocolError::new(
                        200,
                        format!("sample references unknown field id '{key}'"),
                    )
                    .into()),
                }
            })
            .collect()
    }

    async fn wait_until_listed(&self, names: &[&str]) -> crate::Result<()> {
        let config = self.client.config();
        let deadline = Instant::now() + config.resource_wait_timeout;
        loop {
            let listed: Vec<TabularField> = self.list_fields().await?;
            if names
                .iter()
                .all(|name| listed.iter().any(|field| field.name == *name))
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(TransientError::ResourceUnavailable {
                    what: "fields".to_string(),
                    waited: config.resource_wait_timeout,
                }
                .into());
            }
            debug!("fields not listed yet, polling");
            sleep(config.resource_poll_interval).await;
        }
    }
}

fn entry_to_field(entry: FieldEntry) -> TabularField {
    TabularField {
        name: entry.name,
        field_type: entry.field_type,
        id: Some(entry.id),
    }
}
