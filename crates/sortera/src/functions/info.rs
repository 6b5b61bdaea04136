//! Function lifecycle: creation, metadata, training state, deletion.

use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument};

use crate::error::{Error, InvalidInputError, TransientError};
use crate::functions::paths::{FUNCTIONS_PATH, FunctionPaths};
use crate::functions::types::FunctionMetrics;
use crate::functions::wire::{CreateFunctionRequest, CreatedResource, FunctionMeta, FunctionState};
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, OutputModality};

/// Fallback when the service has not stored a name for the function.
const UNNAMED_FUNCTION: &str = "NewFunction";

/// Training states in which the current model covers every sample.
const TRAINED_STATES: [&str; 2] = ["Browsing", "Tuning"];

/// Register a new function with the given modalities.
#[instrument(skip(client))]
pub(crate) async fn create_function(
    client: &ApiClient,
    name: &str,
    input: InputModality,
    output: OutputModality,
) -> crate::Result<FunctionId> {
    let request = CreateFunctionRequest {
        name,
        input,
        output,
    };
    let created: CreatedResource = client.post(FUNCTIONS_PATH, &request).await?;
    info!(function = %created.id, %input, %output, "created function");
    Ok(created.id)
}

#[derive(Clone, Debug)]
pub(crate) struct FunctionInfoApi {
    client: ApiClient,
    paths: FunctionPaths,
}

impl FunctionInfoApi {
    pub(crate) fn new(client: ApiClient, paths: FunctionPaths) -> Self {
        Self { client, paths }
    }

    pub(crate) async fn meta(&self) -> crate::Result<FunctionMeta> {
        self.client.get(&self.paths.meta()).await
    }

    /// Verify the function exists and has the expected modalities.
    pub(crate) async fn ensure_matches(
        &self,
        input: InputModality,
        output: OutputModality,
    ) -> crate::Result<()> {
        let meta = self.meta().await?;
        if meta.input != input || meta.output != output {
            return Err(InvalidInputError::Function {
                value: self.paths.function_id().to_string(),
                reason: format!(
                    "is a {} {} function, expected {} {}",
                    meta.input, meta.output, input, output
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Poll until a freshly created function answers its metadata endpoint.
    pub(crate) async fn wait_until_visible(&self) -> crate::Result<()> {
        let config = self.client.config();
        let deadline = Instant::now() + config.resource_wait_timeout;
        loop {
            match self.meta().await {
                Ok(_) => return Ok(()),
                Err(Error::InvalidRequest(err)) if err.status == 404 => {
                    if Instant::now() >= deadline {
                        return Err(TransientError::ResourceUnavailable {
                            what: "function".to_string(),
                            waited: config.resource_wait_timeout,
                        }
                        .into());
                    }
                    debug!(function = %self.paths.function_id(), "function not visible yet, polling");
                    sleep(config.resource_poll_interval).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub(crate) async fn name(&self) -> crate::Result<String> {
        let meta = self.meta().await?;
        Ok(meta.name.unwrap_or_else(|| UNNAMED_FUNCTION.to_string()))
    }

    pub(crate) async fn metrics(&self) -> crate::Result<FunctionMetrics> {
        self.client.get(&self.paths.metrics()).await
    }

    /// Whether a model trained on the full sample set is serving.
    ///
    /// Metrics alone are not enough: the sample and prediction counts
    /// converge while training is still finalizing, so the training state
    /// is consulted as well.
    pub(crate) async fn has_trained_model(&self) -> crate::Result<bool> {
        let metrics = self.metrics().await?;
        if metrics.is_training || metrics.sample_count != metrics.prediction_count {
            return Ok(false);
        }
        let state: FunctionState = self.client.get(&self.paths.state()).await?;
        Ok(TRAINED_STATES.contains(&state.state.as_str()))
    }

    pub(crate) async fn delete_function(&self) -> crate::Result<()> {
        self.client.delete(&self.paths.meta()).await?;
        info!(function = %self.paths.function_id(), "deleted function");
        Ok(())
    }
}
