//! Terminal interaction for auth-refresher: cancellable prompts, the
//! registry picker, and the spinner shown while external logins run.

pub use cancel::CancelSignal;
pub use error::UiError;
pub use progress::{ProgressIndicator, TICK_INTERVAL};
pub use prompt::{prompt, Prompter, TerminalPrompter, MASK};
pub use select::{clean_selection, entries, Candidate, Entry, RegistrySelector, LAST_USED_MARKER};

mod cancel;
mod error;
mod progress;
mod prompt;
mod select;
