use async_trait::async_trait;
use clap::Args;
use miette::Result;
use refresher_registry::{ConfigStore, Registry, RegistryKind};
use refresher_ui::{prompt, CancelSignal, Prompter, UiError};

use crate::commands::RefresherCommand;
use crate::error::RefresherError;
use crate::Context;

/// Add a registry, or replace one with the same name.
///
/// Prompts for the name, type, URL, and whichever of region or username the
/// type needs. The registry document is created if it does not exist yet.
#[derive(Debug, Args)]
pub struct AddCmd {}

#[async_trait]
impl RefresherCommand for AddCmd {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let prompter = ctx.prompter();
        let added = add_registry(&ctx.store, prompter.as_ref(), &ctx.cancel).await?;
        if added.replaced {
            ctx.success(&format!("Registry '{}' updated", added.name));
        } else {
            ctx.success(&format!("Registry '{}' added", added.name));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Added {
    name: String,
    replaced: bool,
}

/// Prompts for a registry entry and saves it. Re-adding an existing name
/// offers its current values as defaults. Nothing is written unless every
/// prompt is answered.
async fn add_registry(
    store: &ConfigStore,
    prompter: &dyn Prompter,
    cancel: &CancelSignal,
) -> Result<Added> {
    let mut config = store.load_or_default()?;

    let name = prompt(prompter, "Registry name", "", false, cancel)
        .await?
        .trim()
        .to_owned();
    if name.is_empty() {
        return Err(RefresherError::EmptyName.into());
    }
    let existing = config.get(&name).cloned().unwrap_or_default();

    if cancel.is_cancelled() {
        return Err(UiError::Cancelled.into());
    }
    let kinds = RegistryKind::SUPPORTED
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let current = RegistryKind::SUPPORTED
        .iter()
        .position(|kind| *kind == existing.kind)
        .unwrap_or(0);
    let choice = prompter
        .select("Registry type", &kinds, current, cancel)
        .await?;
    let kind = RegistryKind::SUPPORTED
        .get(choice)
        .cloned()
        .ok_or(UiError::Cancelled)?;

    let url = prompt(prompter, "Registry URL", &existing.url, false, cancel)
        .await?
        .trim()
        .to_owned();
    if url.is_empty() {
        return Err(RefresherError::EmptyUrl.into());
    }

    let mut registry = Registry::new(&name, kind.clone(), url);
    if kind.needs_region() {
        let region = prompt(prompter, "Region", &existing.region, false, cancel).await?;
        let region = region.trim();
        if region.is_empty() {
            return Err(RefresherError::MissingRegion(kind.to_string()).into());
        }
        registry = registry.region(region);
    }
    if kind == RegistryKind::Docker {
        let username = prompt(prompter, "Username", &existing.username, false, cancel).await?;
        registry = registry.username(username.trim());
    }

    let replaced = config.upsert(registry).is_some();
    store.save(&config)?;
    tracing::info!("Saved {kind} registry {name}");
    Ok(Added { name, replaced })
}
