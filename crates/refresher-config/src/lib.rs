//! Application options for auth-refresher, layered from an optional options
//! file and `AUTH_REFRESHER_*` environment variables. Command-line flags are
//! applied on top by each [`RefresherConfigLayer`].

use std::path::PathBuf;

pub use clap::ArgMatches;
pub use config::Config as RefresherConfig;
use config::{ConfigError, Environment, File};
use miette::{Diagnostic, Result};
use thiserror::Error;

/// Prefix for environment overrides, e.g. `AUTH_REFRESHER_DOCKER_BIN`.
pub const ENV_PREFIX: &str = "AUTH_REFRESHER";

pub trait RefresherConfigLayer {
    fn layer_config(&mut self, _matches: &ArgMatches, _config: &RefresherConfig) -> Result<()> {
        Ok(())
    }
}

/// Reads `key` as a string, treating a missing key as `None`.
pub fn get_string(config: &RefresherConfig, key: &str) -> Result<Option<String>> {
    match config.get_string(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(RefresherConfigError::ConfigError(err).into()),
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum RefresherConfigError {
    #[error(transparent)]
    #[diagnostic(code(config::error))]
    ConfigError(#[from] ConfigError),
}

pub struct RefresherConfigOptions {
    global: bool,
    env: bool,
    global_config_file: Option<PathBuf>,
}

impl Default for RefresherConfigOptions {
    fn default() -> Self {
        RefresherConfigOptions {
            global: true,
            env: true,
            global_config_file: None,
        }
    }
}

impl RefresherConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    pub fn env(mut self, env: bool) -> Self {
        self.env = env;
        self
    }

    pub fn global_config_file(mut self, file: Option<PathBuf>) -> Self {
        self.global_config_file = file;
        self
    }

    pub fn load(self) -> Result<RefresherConfig> {
        let mut builder = RefresherConfig::builder();
        if self.global {
            if let Some(config_file) = self.global_config_file {
                builder = builder.add_source(File::from(config_file).required(false));
            }
        }
        if self.env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        }
        Ok(builder.build().map_err(RefresherConfigError::ConfigError)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::fs;

    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn env_configs() -> Result<()> {
        env::set_var("AUTH_REFRESHER_HELM_BIN", "/opt/helm/bin/helm");
        let config = RefresherConfigOptions::new().global(false).load()?;
        env::remove_var("AUTH_REFRESHER_HELM_BIN");
        assert_eq!(
            get_string(&config, "helm_bin")?,
            Some(String::from("/opt/helm/bin/helm"))
        );
        Ok(())
    }

    #[test]
    fn global_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let file = dir.path().join("options.toml");
        fs::write(&file, "docker_bin = \"podman\"").into_diagnostic()?;
        let config = RefresherConfigOptions::new()
            .env(false)
            .global_config_file(Some(file))
            .load()?;
        assert_eq!(get_string(&config, "docker_bin")?, Some("podman".into()));
        Ok(())
    }

    #[test]
    fn missing_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let config = RefresherConfigOptions::new()
            .env(false)
            .global_config_file(Some(dir.path().join("nope.toml")))
            .load()?;
        assert_eq!(get_string(&config, "docker_bin")?, None);
        Ok(())
    }
}
