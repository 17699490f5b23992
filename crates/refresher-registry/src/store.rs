use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{RegistryConfigError, Result};
use crate::model::Config;

/// Reads and writes the registry document at a fixed path.
///
/// The store is read once at the start of a command and written once at the
/// end. There is no locking: two concurrent invocations can overwrite each
/// other's changes.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. Fails with [`RegistryConfigError::NotFound`] if
    /// the file does not exist.
    pub fn load(&self) -> Result<Config> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(RegistryConfigError::NotFound(self.path.clone()))
            }
            Err(source) => {
                return Err(RegistryConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        tracing::trace!("Read registry configuration from {}", self.path.display());
        self.parse(&text)
    }

    /// Like [`ConfigStore::load`], but a missing file is an empty document.
    pub fn load_or_default(&self) -> Result<Config> {
        match self.load() {
            Err(RegistryConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Replaces the document on disk with `config`.
    ///
    /// The new contents are written to a sibling temporary file which is then
    /// renamed over the target, so a failed save leaves the previous document
    /// intact.
    pub fn save(&self, config: &Config) -> Result<()> {
        let text = serde_yaml::to_string(config).map_err(RegistryConfigError::SerializeError)?;
        let write_err = |source| RegistryConfigError::WriteError {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        tracing::trace!("Wrote registry configuration to {}", self.path.display());
        Ok(())
    }

    fn parse(&self, text: &str) -> Result<Config> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        let mut config: Config =
            serde_yaml::from_str(text).map_err(|source| RegistryConfigError::ParseError {
                path: self.path.clone(),
                source,
            })?;
        config.normalize();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::model::{Registry, RegistryKind};

    const DOC: &str = "\
current_registry: prod
registries:
  prod:
    name: prod
    type: aws
    url: 123456789012.dkr.ecr.eu-west-1.amazonaws.com
    region: eu-west-1
    last_login: 2024-01-02 03:04:05
  hub:
    name: hub
    type: docker
    url: registry-1.docker.io
    username: me
    last_logout: 2024-01-01 00:00:00
";

    #[test]
    fn missing_file() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let store = ConfigStore::new(dir.path().join("config.yaml"));
        assert!(matches!(store.load(), Err(RegistryConfigError::NotFound(_))));
        assert_eq!(store.load_or_default()?, Config::default());
        Ok(())
    }

    #[test]
    fn round_trip() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, DOC).into_diagnostic()?;
        let store = ConfigStore::new(&path);
        let config = store.load()?;
        assert_eq!(config.current_registry, "prod");
        assert_eq!(config.registries["prod"].kind, RegistryKind::Aws);
        assert_eq!(config.registries["hub"].username, "me");

        store.save(&config)?;
        assert_eq!(store.load()?, config);
        Ok(())
    }

    #[test]
    fn save_replaces_contents() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("nested").join("config.yaml");
        let store = ConfigStore::new(&path);
        let mut config = Config::default();
        for name in ["one", "two", "three"] {
            config.upsert(Registry::new(name, RegistryKind::Docker, "example.com"));
        }
        store.save(&config)?;
        let long = std::fs::read_to_string(&path).into_diagnostic()?;

        config.registries.retain(|name, _| name == "one");
        store.save(&config)?;
        let short = std::fs::read_to_string(&path).into_diagnostic()?;
        assert!(short.len() < long.len());
        assert!(!short.contains("three"));
        assert_eq!(store.load()?, config);
        Ok(())
    }

    #[test]
    fn legacy_key_and_missing_names() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "last_used_registry: charts\nregistries:\n  charts:\n    type: helm\n    url: oci.example.com\n",
        )
        .into_diagnostic()?;
        let config = ConfigStore::new(&path).load()?;
        assert_eq!(config.current(), Some("charts"));
        assert_eq!(config.registries["charts"].name, "charts");
        Ok(())
    }

    #[test]
    fn unknown_kinds_survive() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "registries:\n  odd:\n    name: odd\n    type: quay\n    url: quay.io\n  blank:\n    name: blank\n    url: x\n",
        )
        .into_diagnostic()?;
        let store = ConfigStore::new(&path);
        let config = store.load()?;
        assert_eq!(
            config.registries["odd"].kind,
            RegistryKind::Unknown("quay".into())
        );
        assert_eq!(config.registries["blank"].kind, RegistryKind::default());
        store.save(&config)?;
        assert_eq!(store.load()?, config);
        Ok(())
    }

    #[test]
    fn empty_file_is_empty_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").into_diagnostic()?;
        assert_eq!(ConfigStore::new(&path).load()?, Config::default());
        Ok(())
    }

    #[test]
    fn parse_errors() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "registries: [oops").into_diagnostic()?;
        assert!(matches!(
            ConfigStore::new(&path).load(),
            Err(RegistryConfigError::ParseError { .. })
        ));
        Ok(())
    }
}
