use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryConfigError {
    /// The registry document does not exist yet.
    #[error("Registry configuration not found at {}.", .0.display())]
    #[diagnostic(
        code(refresher_registry::not_found),
        help("Add a registry first with `auth-refresher add`.")
    )]
    NotFound(PathBuf),

    /// Failed to read the registry document from disk.
    #[error("Failed to read registry configuration at {}.", .path.display())]
    #[diagnostic(code(refresher_registry::read_error))]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry document is not valid YAML, or does not have the
    /// expected shape.
    #[error("Failed to parse registry configuration at {}.", .path.display())]
    #[diagnostic(
        code(refresher_registry::parse_error),
        help("Check the file for syntax errors. Each entry under `registries` needs at least a `type` and a `url`.")
    )]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to serialize the in-memory configuration.
    #[error("Failed to serialize registry configuration.")]
    #[diagnostic(code(refresher_registry::serialize_error))]
    SerializeError(#[source] serde_yaml::Error),

    /// Failed to write the registry document back to disk.
    #[error("Failed to write registry configuration to {}.", .path.display())]
    #[diagnostic(code(refresher_registry::write_error))]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) type Result<T> = std::result::Result<T, RegistryConfigError>;
