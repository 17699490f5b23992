//! Registry session orchestration: resolves credentials, runs the right
//! external login or logout sequence for each registry kind, and commits the
//! resulting session timestamps.

pub use error::SessionError;
pub use orchestrator::{Phase, SessionOrchestrator};
pub use plan::{Tools, AWS_TOKEN_USERNAME};
pub use runner::{CommandRunner, CommandSpec, ProcessRunner};

mod error;
mod orchestrator;
mod plan;
mod runner;
