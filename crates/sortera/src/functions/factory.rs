//! Loaders that dispatch on a function's stored modalities.

use crate::error::InvalidInputError;
use crate::functions::image::ImageClassificationFunction;
use crate::functions::info::FunctionInfoApi;
use crate::functions::paths::FunctionPaths;
use crate::functions::tabular::TabularClassificationFunction;
use crate::functions::tags::{ImageTagsFunction, TabularTagsFunction, TextTagsFunction};
use crate::functions::text::TextClassificationFunction;
use crate::functions::traits::{ClassificationFunction, TagsFunction};
use crate::functions::wire::FunctionMeta;
use crate::http::ApiClient;
use crate::types::{FunctionId, InputModality, OutputModality};

/// A classification function of any input modality.
pub enum AnyClassificationFunction {
    Text(TextClassificationFunction),
    Image(ImageClassificationFunction),
    Tabular(TabularClassificationFunction),
}

impl AnyClassificationFunction {
    pub fn input(&self) -> InputModality {
        match self {
            Self::Text(_) => InputModality::Text,
            Self::Image(_) => InputModality::Image,
            Self::Tabular(_) => InputModality::Tabular,
        }
    }

    pub fn function_id(&self) -> &FunctionId {
        match self {
            Self::Text(function) => function.function_id(),
            Self::Image(function) => function.function_id(),
            Self::Tabular(function) => function.function_id(),
        }
    }

    pub fn into_text(self) -> Option<TextClassificationFunction> {
        match self {
            Self::Text(function) => Some(function),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<ImageClassificationFunction> {
        match self {
            Self::Image(function) => Some(function),
            _ => None,
        }
    }

    pub fn into_tabular(self) -> Option<TabularClassificationFunction> {
        match self {
            Self::Tabular(function) => Some(function),
            _ => None,
        }
    }
}

/// A tags function of any input modality.
#[derive(Debug)]
pub enum AnyTagsFunction {
    Text(TextTagsFunction),
    Image(ImageTagsFunction),
    Tabular(TabularTagsFunction),
}

impl AnyTagsFunction {
    pub fn input(&self) -> InputModality {
        match self {
            Self::Text(_) => InputModality::Text,
            Self::Image(_) => InputModality::Image,
            Self::Tabular(_) => InputModality::Tabular,
        }
    }

    pub fn function_id(&self) -> &FunctionId {
        match self {
            Self::Text(function) => function.function_id(),
            Self::Image(function) => function.function_id(),
            Self::Tabular(function) => function.function_id(),
        }
    }

    pub fn into_text(self) -> Option<TextTagsFunction> {
        match self {
            Self::Text(function) => Some(function),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<ImageTagsFunction> {
        match self {
            Self::Image(function) => Some(function),
            _ => None,
        }
    }

    pub fn into_tabular(self) -> Option<TabularTagsFunction> {
        match self {
            Self::Tabular(function) => Some(function),
            _ => None,
        }
    }
}

/// Load a classification function whose input modality is not known ahead
/// of time, dispatching on the modalities the service reports.
pub async fn load_classification_function(
    client: &ApiClient,
    function_id: FunctionId,
) -> crate::Result<AnyClassificationFunction> {
    let meta = read_meta(client, &function_id).await?;
    ensure_output(&function_id, &meta, OutputModality::Classification)?;
    Ok(match meta.input {
        InputModality::Text => AnyClassificationFunction::Text(
            TextClassificationFunction::load(client, function_id).await?,
        ),
        InputModality::Image => AnyClassificationFunction::Image(
            ImageClassificationFunction::load(client, function_id).await?,
        ),
        InputModality::Tabular => AnyClassificationFunction::Tabular(
            TabularClassificationFunction::load(client, function_id).await?,
        ),
    })
}

/// Load a tags function whose input modality is not known ahead of time,
/// dispatching on the modalities the service reports.
pub async fn load_tags_function(
    client: &ApiClient,
    function_id: FunctionId,
) -> crate::Result<AnyTagsFunction> {
    let meta = read_meta(client, &function_id).await?;
    ensure_output(&function_id, &meta, OutputModality::Tags)?;
    Ok(match meta.input {
        InputModality::Text => {
            AnyTagsFunction::Text(TextTagsFunction::load(client, function_id).await?)
        }
        InputModality::Image => {
            AnyTagsFunction::Image(ImageTagsFunction::load(client, function_id).await?)
        }
        InputModality::Tabular => {
            AnyTagsFunction::Tabular(TabularTagsFunction::load(client, function_id).await?)
        }
    })
}

async fn read_meta(client: &ApiClient, function_id: &FunctionId) -> crate::Result<FunctionMeta> {
    let paths = FunctionPaths::classification(function_id.clone());
    FunctionInfoApi::new(client.clone(), paths).meta().await
}

fn ensure_output(
    function_id: &FunctionId,
    meta: &FunctionMeta,
    expected: OutputModality,
) -> crate::Result<()> {
    if meta.output != expected {
        return Err(InvalidInputError::Function {
            value: function_id.to_string(),
            reason: format!("is a {} function, expected {}", meta.output, expected),
        }
        .into());
    }
    Ok(())
}
