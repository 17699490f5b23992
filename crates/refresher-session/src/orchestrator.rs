use std::fmt;
use std::sync::Arc;

use refresher_registry::{now_timestamp, Config, ConfigStore, Registry, RegistryKind};
use refresher_ui::{clean_selection, prompt, CancelSignal, ProgressIndicator, Prompter};

use crate::error::{Result, SessionError};
use crate::plan::{Tools, AWS_TOKEN_USERNAME};
use crate::runner::CommandRunner;

/// Where a login or logout attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Selecting,
    ResolvingCredentials,
    Executing,
    Persisting,
    Done,
    Failed,
    Cancelled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Phase::Selecting => "selecting",
            Phase::ResolvingCredentials => "resolving credentials",
            Phase::Executing => "executing",
            Phase::Persisting => "persisting",
            Phase::Done => "done",
            Phase::Failed => "failed",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(phase)
    }
}

/// Logs in to and out of registries, keeping the registry document's
/// session fields up to date.
///
/// Nothing is written for a login unless every external command succeeded.
/// Logouts always record `last_logout`, even when the client fails, and then
/// report the failure. Entries of an unsupported type have no client to run
/// and only get the timestamp.
pub struct SessionOrchestrator {
    store: ConfigStore,
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn Prompter>,
    tools: Tools,
    progress: bool,
}

impl SessionOrchestrator {
    pub fn new(
        store: ConfigStore,
        runner: Arc<dyn CommandRunner>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            store,
            runner,
            prompter,
            tools: Tools::default(),
            progress: false,
        }
    }

    /// Client binaries to invoke.
    pub fn tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// Show a spinner while external commands run.
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Logs in to the registry called `selected` (picker decoration is
    /// stripped first) and returns the committed configuration.
    pub async fn login(
        &self,
        selected: &str,
        config: &Config,
        cancel: &CancelSignal,
    ) -> Result<Config> {
        let name = clean_selection(selected);
        let result = self.try_login(name, config, cancel).await;
        finish(name, "login", &result);
        result
    }

    /// Logs out of the registry called `selected`, recording `last_logout`
    /// whether or not the client succeeded.
    pub async fn logout(
        &self,
        selected: &str,
        config: &Config,
        cancel: &CancelSignal,
    ) -> Result<Config> {
        let name = clean_selection(selected);
        let result = self.try_logout(name, config, cancel).await;
        finish(name, "logout", &result);
        result
    }

    async fn try_login(&self, name: &str, config: &Config, cancel: &CancelSignal) -> Result<Config> {
        enter(name, Phase::Selecting);
        let mut registry = lookup(name, config)?;
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        enter(name, Phase::ResolvingCredentials);
        if registry.kind == RegistryKind::Docker && registry.password.is_empty() {
            let label = if registry.username.is_empty() {
                format!("Password for {name}")
            } else {
                format!("Password for {} at {name}", registry.username)
            };
            registry.password = prompt(&*self.prompter, &label, "", true, cancel).await?;
        }

        enter(name, Phase::Executing);
        ProgressIndicator::wrap(
            format!("Logging in to {name}"),
            self.progress,
            self.execute_login(&registry, cancel),
        )
        .await?;

        enter(name, Phase::Persisting);
        registry.password.clear();
        registry.last_login = Some(now_timestamp());
        let mut updated = config.clone();
        updated.current_registry = name.to_owned();
        updated.registries.insert(name.to_owned(), registry);
        self.store.save(&updated)?;
        Ok(updated)
    }

    async fn execute_login(&self, registry: &Registry, cancel: &CancelSignal) -> Result<()> {
        let tools = &self.tools;
        let login = match &registry.kind {
            RegistryKind::Docker => tools.docker_login(
                &registry.username,
                &registry.url,
                registry.password.as_bytes(),
            ),
            RegistryKind::Aws => {
                let token = self.fetch_token(registry, cancel).await?;
                tools.docker_login(AWS_TOKEN_USERNAME, &registry.url, token)
            }
            RegistryKind::Helm => {
                let token = self.fetch_token(registry, cancel).await?;
                tools.helm_login(&registry.url, token)
            }
            RegistryKind::Unknown(_) => return Err(unsupported(registry)),
        };
        self.runner.run(&login, cancel).await?;
        Ok(())
    }

    async fn fetch_token(&self, registry: &Registry, cancel: &CancelSignal) -> Result<Vec<u8>> {
        tracing::debug!(
            "Fetching a registry token for {} in region {:?}",
            registry.name,
            registry.region
        );
        self.runner
            .run(&self.tools.token_fetch(&registry.region), cancel)
            .await
    }

    async fn try_logout(
        &self,
        name: &str,
        config: &Config,
        cancel: &CancelSignal,
    ) -> Result<Config> {
        enter(name, Phase::Selecting);
        let mut registry = find(name, config)?;
        let logout = match &registry.kind {
            RegistryKind::Docker | RegistryKind::Aws => {
                Some(self.tools.docker_logout(&registry.url))
            }
            RegistryKind::Helm => Some(self.tools.helm_logout(&registry.url)),
            RegistryKind::Unknown(kind) => {
                tracing::warn!("No logout client for {name} (type {kind:?}), recording it anyway");
                None
            }
        };

        enter(name, Phase::Executing);
        let outcome = match logout {
            Some(logout) => ProgressIndicator::wrap(
                format!("Logging out of {name}"),
                self.progress,
                self.runner.run(&logout, cancel),
            )
            .await
            .map(|_| ()),
            None if cancel.is_cancelled() => Err(SessionError::Cancelled),
            None => Ok(()),
        };
        if let Err(SessionError::Cancelled) = outcome {
            return Err(SessionError::Cancelled);
        }

        enter(name, Phase::Persisting);
        registry.last_logout = Some(now_timestamp());
        let mut updated = config.clone();
        updated.registries.insert(name.to_owned(), registry);
        if let Err(err) = self.store.save(&updated) {
            if let Err(command_err) = &outcome {
                tracing::warn!("{command_err}");
            }
            return Err(err.into());
        }
        outcome.map(|_| updated)
    }
}

fn find(name: &str, config: &Config) -> Result<Registry> {
    config
        .get(name)
        .cloned()
        .ok_or_else(|| SessionError::UnknownRegistry(name.to_owned()))
}

/// Finds `name` and checks its kind before anything is prompted or spawned.
fn lookup(name: &str, config: &Config) -> Result<Registry> {
    let registry = find(name, config)?;
    if !registry.kind.is_supported() {
        return Err(unsupported(&registry));
    }
    Ok(registry)
}

fn unsupported(registry: &Registry) -> SessionError {
    SessionError::UnsupportedKind {
        name: registry.name.clone(),
        kind: registry.kind.to_string(),
    }
}

fn enter(name: &str, phase: Phase) {
    tracing::debug!("{name}: {phase}");
}

fn finish<T>(name: &str, action: &str, result: &Result<T>) {
    match result {
        Ok(_) => enter(name, Phase::Done),
        Err(SessionError::Cancelled) => enter(name, Phase::Cancelled),
        Err(err) => {
            enter(name, Phase::Failed);
            tracing::info!("{action} for {name} failed: {err}");
        }
    }
}
