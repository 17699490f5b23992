use miette::Diagnostic;
use refresher_registry::RegistryConfigError;
use refresher_ui::UiError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// The user or the process aborted the operation. Nothing was changed.
    #[error("Operation cancelled by user.")]
    #[diagnostic(code(refresher_session::cancelled))]
    Cancelled,

    /// No registry with this name exists in the configuration.
    #[error("Registry '{0}' not found in the configuration.")]
    #[diagnostic(
        code(refresher_session::unknown_registry),
        help("Run `auth-refresher list` to see the configured registries.")
    )]
    UnknownRegistry(String),

    /// The registry's `type` is missing or not one we know how to log in to.
    #[error("Registry '{name}' has unsupported type '{kind}'.")]
    #[diagnostic(
        code(refresher_session::unsupported_kind),
        help("Supported types are `aws`, `helm` and `docker`.")
    )]
    UnsupportedKind { name: String, kind: String },

    /// An external client could not be started.
    #[error("Failed to start `{program}`.")]
    #[diagnostic(
        code(refresher_session::spawn_error),
        help("Make sure `{program}` is installed and on your PATH.")
    )]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Talking to a running external client failed.
    #[error("Error while running `{program}`.")]
    #[diagnostic(code(refresher_session::process_error))]
    ProcessError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external client exited unsuccessfully. Whatever it printed to
    /// stderr is shown as help.
    #[error("`{command}` exited with {status}.")]
    #[diagnostic(code(refresher_session::command_failed))]
    CommandFailed {
        command: String,
        status: String,
        #[help]
        stderr: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigError(#[from] RegistryConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UiError(UiError),
}

impl SessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}

impl From<UiError> for SessionError {
    fn from(err: UiError) -> Self {
        match err {
            UiError::Cancelled => SessionError::Cancelled,
            other => SessionError::UiError(other),
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, SessionError>;
