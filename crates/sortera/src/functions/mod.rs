//! Typed wrappers for classification and tags functions.

mod core;
mod factory;
mod fields;
mod image;
mod info;
mod labels;
mod paths;
mod samples;
mod tabular;
mod tags;
mod tags_samples;
mod text;
mod traits;
mod types;
mod wire;

pub use factory::{
    AnyClassificationFunction, AnyTagsFunction, load_classification_function, load_tags_function,
};
pub use image::ImageClassificationFunction;
pub use tabular::TabularClassificationFunction;
pub use tags::{ImageTagsFunction, TabularTagsFunction, TextTagsFunction};
pub use text::TextClassificationFunction;
pub use traits::{ClassificationFunction, TagsFunction};
pub use types::{
    Annotation, FieldType, FieldValue, FunctionMetrics, ImageData, ImageSample, ImageTagsSample,
    Label, Prediction, Sample, TabularData, TabularField, TabularSample, TabularTagsSample,
    TagAnnotation, TagsPrediction, TagsSample, TextSample, TextTagsSample,
};
