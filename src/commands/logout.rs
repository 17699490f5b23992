use async_trait::async_trait;
use clap::Args;
use miette::Result;
use refresher_ui::{clean_selection, RegistrySelector};

use crate::commands::RefresherCommand;
use crate::Context;

/// Log out of a registry.
///
/// The logout time is recorded even if the client reports a failure.
#[derive(Debug, Args)]
pub struct LogoutCmd {
    /// Registry to log out of. Prompts for one when omitted.
    name: Option<String>,
}

#[async_trait]
impl RefresherCommand for LogoutCmd {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let config = ctx.store.load()?;
        let name = match self.name {
            Some(name) => name,
            None => {
                let prompter = ctx.prompter();
                RegistrySelector::new(prompter.as_ref())
                    .label("Select a registry to log out of")
                    .choose_from(&config, &ctx.cancel)
                    .await?
            }
        };
        ctx.orchestrator().logout(&name, &config, &ctx.cancel).await?;
        ctx.success(&format!("Logged out of {}", clean_selection(&name)));
        Ok(())
    }
}
