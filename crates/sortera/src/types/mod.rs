//! Validated value types shared across the client.

mod modality;
mod resource_id;
mod server_url;

pub use modality::{InputModality, OutputModality};
pub use resource_id::{FunctionId, ResourceId};
pub use server_url::ServerUrl;
