use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum UiError {
    /// The user aborted the prompt, or the process was interrupted while
    /// waiting on it. Callers should stop quietly.
    #[error("Operation cancelled by user.")]
    #[diagnostic(code(refresher_ui::cancelled))]
    Cancelled,

    /// There was nothing to choose from.
    #[error("No registries to choose from.")]
    #[diagnostic(
        code(refresher_ui::no_candidates),
        help("Add a registry first with `auth-refresher add`.")
    )]
    NoCandidates,

    /// Reading from or drawing to the terminal failed.
    #[error("Failed to interact with the terminal.")]
    #[diagnostic(code(refresher_ui::terminal_error))]
    TerminalError(#[source] std::io::Error),
}

impl UiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UiError::Cancelled)
    }
}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        // Both console and crossterm report Ctrl+C in raw mode as an
        // interrupted read.
        if err.kind() == std::io::ErrorKind::Interrupted {
            UiError::Cancelled
        } else {
            UiError::TerminalError(err)
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, UiError>;
