//! Authenticated request client and its configuration.

mod client;
mod config;

pub use client::ApiClient;
pub use config::ClientConfig;

pub(crate) use client::is_retryable_status;
