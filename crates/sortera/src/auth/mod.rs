//! Credential handling and bearer token renewal.
//!
//! Every authenticated call obtains its `Authorization` header from the
//! token manager owned by the client; tokens never leave this module.

mod credentials;
mod manager;
mod token;

pub use credentials::{Credentials, DEFAULT_SERVER_URL};
pub(crate) use manager::TokenManager;
