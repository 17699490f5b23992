use std::sync::Arc;

use is_terminal::IsTerminal;
use refresher_registry::ConfigStore;
use refresher_session::{ProcessRunner, SessionOrchestrator, Tools};
use refresher_ui::{CancelSignal, Prompter, TerminalPrompter};

use crate::output;

/// Everything a command needs once options have been layered: where the
/// registry document lives, which clients to run, and the interrupt signal.
#[derive(Debug)]
pub struct Context {
    pub store: ConfigStore,
    pub tools: Tools,
    pub cancel: CancelSignal,
    pub quiet: bool,
}

impl Context {
    pub fn new(store: ConfigStore, tools: Tools, cancel: CancelSignal, quiet: bool) -> Self {
        Self {
            store,
            tools,
            cancel,
            quiet,
        }
    }

    pub fn prompter(&self) -> Arc<dyn Prompter> {
        Arc::new(TerminalPrompter::new())
    }

    pub fn orchestrator(&self) -> SessionOrchestrator {
        SessionOrchestrator::new(
            self.store.clone(),
            Arc::new(ProcessRunner::new()),
            self.prompter(),
        )
        .tools(self.tools.clone())
        .progress(!self.quiet && std::io::stderr().is_terminal())
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            output::success(message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            output::info(message);
        }
    }
}
