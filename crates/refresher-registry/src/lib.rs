//! The registry document: which registries exist, how to authenticate
//! against each of them, and when each was last logged in to or out of.

pub use error::RegistryConfigError;
pub use model::{now_timestamp, Config, Registry, RegistryKind, TIMESTAMP_FORMAT};
pub use store::ConfigStore;

mod error;
mod model;
mod store;
