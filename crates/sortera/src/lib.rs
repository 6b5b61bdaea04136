//! Typed async client for the Sortera classification service.
//!
//! Sortera hosts classification functions: you define labels, post
//! annotated samples, and the service trains and serves a model. This
//! crate wraps the HTTP API behind typed function wrappers, one per
//! combination of input modality (text, image, tabular) and output
//! modality (single-label classification, multi-label tags).
//!
//! Credentials are exchanged for a bearer token transparently, expiring
//! tokens are renewed ahead of time, and transient failures are retried
//! with exponential backoff.
//!
//! ```no_run
//! use sortera::{
//!     ApiClient, ClassificationFunction, Credentials, TextClassificationFunction, TextSample,
//! };
//!
//! #[tokio::main]
//! async fn main() -> sortera::Result<()> {
//!     let client = ApiClient::new(Credentials::new("client-id", "client-secret"));
//!     let function = TextClassificationFunction::create(&client, "sentiment").await?;
//!     function
//!         .create_samples(&[
//!             TextSample::from("this rocks").with_annotation("positive"),
//!             TextSample::from("utterly broken").with_annotation("negative"),
//!         ])
//!         .await?;
//!     let prediction = function.invoke_one(&"pretty solid".to_string()).await?;
//!     println!("{} ({:.2})", prediction.label_name, prediction.confidence);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod functions;
pub mod http;
pub mod types;

pub use auth::{Credentials, DEFAULT_SERVER_URL};
pub use error::Error;
pub use functions::{
    Annotation, AnyClassificationFunction, AnyTagsFunction, ClassificationFunction, FieldType,
    FieldValue, FunctionMetrics, ImageClassificationFunction, ImageData, ImageSample,
    ImageTagsFunction, ImageTagsSample, Label, Prediction, Sample, TabularClassificationFunction,
    TabularData, TabularField, TabularSample, TabularTagsFunction, TabularTagsSample,
    TagAnnotation, TagsFunction, TagsPrediction, TagsSample, TextClassificationFunction,
    TextSample, TextTagsFunction, TextTagsSample, load_classification_function, load_tags_function,
};
pub use http::{ApiClient, ClientConfig};
pub use types::{FunctionId, InputModality, OutputModality, ResourceId, ServerUrl};

/// Result type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
