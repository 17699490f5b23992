use async_trait::async_trait;
use clap::Args;
use miette::Result;
use refresher_ui::{clean_selection, RegistrySelector};

use crate::commands::RefresherCommand;
use crate::Context;

/// Log in to a registry.
#[derive(Debug, Args)]
pub struct LoginCmd {
    /// Registry to log in to. Prompts for one when omitted.
    name: Option<String>,
}

#[async_trait]
impl RefresherCommand for LoginCmd {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let config = ctx.store.load()?;
        let name = match self.name {
            Some(name) => name,
            None => {
                let prompter = ctx.prompter();
                RegistrySelector::new(prompter.as_ref())
                    .label("Select a registry to log in to")
                    .choose_from(&config, &ctx.cancel)
                    .await?
            }
        };
        let updated = ctx.orchestrator().login(&name, &config, &ctx.cancel).await?;
        tracing::debug!("Current registry is now {}", updated.current_registry);
        ctx.success(&format!("Logged in to {}", clean_selection(&name)));
        Ok(())
    }
}
