use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Format used for `last_login` and `last_logout`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, formatted for the session timestamps.
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Authentication protocol used to talk to a registry.
///
/// The document stores this as a plain string. Anything other than the three
/// known kinds is kept around as [`RegistryKind::Unknown`] so a single bad
/// entry doesn't make the whole file unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistryKind {
    /// ECR: the cloud CLI mints a short-lived token for the container runtime.
    Aws,
    /// OCI chart registry, authenticated with a cloud CLI token.
    Helm,
    /// Plain username/password against the container runtime.
    Docker,
    Unknown(String),
}

impl RegistryKind {
    /// Kinds that can be picked when adding a registry.
    pub const SUPPORTED: [RegistryKind; 3] =
        [RegistryKind::Aws, RegistryKind::Helm, RegistryKind::Docker];

    pub fn as_str(&self) -> &str {
        match self {
            RegistryKind::Aws => "aws",
            RegistryKind::Helm => "helm",
            RegistryKind::Docker => "docker",
            RegistryKind::Unknown(kind) => kind,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, RegistryKind::Unknown(_))
    }

    /// Whether logging in requires a region for the cloud token fetch.
    pub fn needs_region(&self) -> bool {
        matches!(self, RegistryKind::Aws | RegistryKind::Helm)
    }
}

impl Default for RegistryKind {
    fn default() -> Self {
        RegistryKind::Unknown(String::new())
    }
}

impl From<String> for RegistryKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "aws" => RegistryKind::Aws,
            "helm" => RegistryKind::Helm,
            "docker" => RegistryKind::Docker,
            _ => RegistryKind::Unknown(kind),
        }
    }
}

impl From<&str> for RegistryKind {
    fn from(kind: &str) -> Self {
        RegistryKind::from(kind.to_owned())
    }
}

impl From<RegistryKind> for String {
    fn from(kind: RegistryKind) -> Self {
        match kind {
            RegistryKind::Unknown(kind) => kind,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for RegistryKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RegistryKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// A single named registry entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RegistryKind,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Only present while a login is in flight. Cleared before the entry is
    /// written back after a successful login.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_logout: Option<String>,
}

impl Registry {
    pub fn new(name: impl Into<String>, kind: RegistryKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Compares two entries by `(name, kind)`.
    pub fn display_order(&self, other: &Registry) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

/// The whole registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        default,
        alias = "last_used_registry",
        skip_serializing_if = "String::is_empty"
    )]
    pub current_registry: String,
    #[serde(default)]
    pub registries: BTreeMap<String, Registry>,
}

impl Config {
    /// Looks up a registry by its exact name.
    pub fn get(&self, name: &str) -> Option<&Registry> {
        self.registries.get(name)
    }

    /// Inserts or replaces a registry, keyed by its name.
    pub fn upsert(&mut self, registry: Registry) -> Option<Registry> {
        self.registries.insert(registry.name.clone(), registry)
    }

    /// The most recently used registry name, if it still exists.
    pub fn current(&self) -> Option<&str> {
        if self.current_registry.is_empty() || !self.registries.contains_key(&self.current_registry)
        {
            None
        } else {
            Some(&self.current_registry)
        }
    }

    /// All registries sorted by `(name, kind)`.
    pub fn sorted(&self) -> Vec<&Registry> {
        let mut registries = self.registries.values().collect::<Vec<_>>();
        registries.sort_by(|a, b| a.display_order(b));
        registries
    }

    /// Fills in entry names that were left out of the document, using the
    /// map key.
    pub(crate) fn normalize(&mut self) {
        for (key, registry) in self.registries.iter_mut() {
            if registry.name.is_empty() {
                registry.name = key.clone();
            }
        }
    }
}
