use std::cmp::Ordering;

use refresher_registry::{Config, RegistryKind};

use crate::cancel::CancelSignal;
use crate::error::{Result, UiError};
use crate::prompt::Prompter;

/// Suffix appended to the most recently used registry in the picker.
pub const LAST_USED_MARKER: &str = " (last used)";

/// Strips the [`LAST_USED_MARKER`] decoration, if any, from a picker label.
pub fn clean_selection(label: &str) -> &str {
    label.strip_suffix(LAST_USED_MARKER).unwrap_or(label)
}

/// One selectable registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub kind: RegistryKind,
}

impl Candidate {
    pub fn new(name: impl Into<String>, kind: RegistryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    fn order(&self, other: &Candidate) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

/// A line of the picker, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub candidate: Candidate,
    pub last_used: bool,
}

/// Builds the picker entries: the most recently used candidate first, with
/// [`LAST_USED_MARKER`] appended, followed by everything else sorted by
/// `(name, kind)`.
pub fn entries(candidates: &[Candidate], most_recent: Option<&str>) -> Vec<Entry> {
    let mut rest = candidates.to_vec();
    rest.sort_by(Candidate::order);
    let first = most_recent
        .and_then(|name| rest.iter().position(|c| c.name == name))
        .map(|idx| rest.remove(idx));
    first
        .into_iter()
        .map(|candidate| Entry {
            label: format!("{}{LAST_USED_MARKER}", candidate.name),
            candidate,
            last_used: true,
        })
        .chain(rest.into_iter().map(|candidate| Entry {
            label: candidate.name.clone(),
            candidate,
            last_used: false,
        }))
        .collect()
}

/// Interactive registry picker.
pub struct RegistrySelector<'a> {
    prompter: &'a dyn Prompter,
    label: String,
}

impl<'a> RegistrySelector<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self {
            prompter,
            label: "Select a registry".into(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Candidates for every registry in `config`.
    pub fn candidates(config: &Config) -> Vec<Candidate> {
        config
            .registries
            .iter()
            .map(|(name, registry)| Candidate::new(name, registry.kind.clone()))
            .collect()
    }

    /// Asks the user to pick one of `candidates` and returns the chosen
    /// name, without any decoration.
    pub async fn choose(
        &self,
        candidates: &[Candidate],
        most_recent: Option<&str>,
        cancel: &CancelSignal,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(UiError::Cancelled);
        }
        if candidates.is_empty() {
            return Err(UiError::NoCandidates);
        }
        let entries = entries(candidates, most_recent);
        let labels = entries
            .iter()
            .map(|e| e.label.clone())
            .collect::<Vec<_>>();
        let idx = self.prompter.select(&self.label, &labels, 0, cancel).await?;
        let label = labels.get(idx).ok_or(UiError::Cancelled)?;
        let name = clean_selection(label).to_owned();
        tracing::debug!("Selected registry {name}");
        Ok(name)
    }

    /// Picks a registry from `config`, highlighting its current registry.
    pub async fn choose_from(&self, config: &Config, cancel: &CancelSignal) -> Result<String> {
        self.choose(&Self::candidates(config), config.current(), cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use refresher_registry::Registry;

    struct Picker {
        pick: usize,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Prompter for Picker {
        async fn select(
            &self,
            _: &str,
            items: &[String],
            _: usize,
            _: &CancelSignal,
        ) -> Result<usize> {
            *self.seen.lock().unwrap() = items.to_vec();
            Ok(self.pick)
        }

        async fn input(&self, _: &str, _: &str, _: bool, _: &CancelSignal) -> Result<String> {
            Err(UiError::Cancelled)
        }
    }

    struct Aborts;

    #[async_trait]
    impl Prompter for Aborts {
        async fn select(&self, _: &str, _: &[String], _: usize, _: &CancelSignal) -> Result<usize> {
            Err(UiError::Cancelled)
        }

        async fn input(&self, _: &str, _: &str, _: bool, _: &CancelSignal) -> Result<String> {
            Err(UiError::Cancelled)
        }
    }

    fn labels(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn sorted_without_recent() {
        let candidates = vec![
            Candidate::new("zeta", RegistryKind::Docker),
            Candidate::new("alpha", RegistryKind::Helm),
            Candidate::new("mid", RegistryKind::Aws),
        ];
        let entries = entries(&candidates, None);
        assert_eq!(labels(&entries), vec!["alpha", "mid", "zeta"]);
        assert!(entries.iter().all(|e| !e.last_used));
    }

    #[test]
    fn recent_goes_first() {
        let candidates = vec![
            Candidate::new("b", RegistryKind::Docker),
            Candidate::new("c", RegistryKind::Aws),
            Candidate::new("a", RegistryKind::Helm),
        ];
        let entries = entries(&candidates, Some("c"));
        assert_eq!(labels(&entries), vec!["c (last used)", "a", "b"]);
        assert!(entries[0].last_used);
        assert_eq!(entries[0].candidate.name, "c");
    }

    #[test]
    fn name_ties_sort_by_kind() {
        let candidates = vec![
            Candidate::new("shared", RegistryKind::Helm),
            Candidate::new("shared", RegistryKind::Aws),
            Candidate::new("other", RegistryKind::Docker),
        ];
        let kinds = entries(&candidates, None)
            .into_iter()
            .map(|e| (e.candidate.name, e.candidate.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("other".to_string(), RegistryKind::Docker),
                ("shared".to_string(), RegistryKind::Aws),
                ("shared".to_string(), RegistryKind::Helm),
            ]
        );
    }

    #[test]
    fn stale_recent_is_ignored() {
        let candidates = vec![Candidate::new("a", RegistryKind::Aws)];
        assert_eq!(labels(&entries(&candidates, Some("gone"))), vec!["a"]);
    }

    #[test]
    fn cleaning() {
        assert_eq!(clean_selection("prod (last used)"), "prod");
        assert_eq!(clean_selection("prod"), "prod");
    }

    #[async_std::test]
    async fn choose_strips_marker() -> miette::Result<()> {
        let mut config = Config::default();
        config.upsert(Registry::new("hub", RegistryKind::Docker, "docker.io"));
        config.upsert(Registry::new("ecr", RegistryKind::Aws, "ecr.example.com"));
        config.current_registry = "hub".into();
        let picker = Picker {
            pick: 0,
            seen: Mutex::new(Vec::new()),
        };
        let name = RegistrySelector::new(&picker)
            .choose_from(&config, &CancelSignal::new())
            .await?;
        assert_eq!(name, "hub");
        assert_eq!(
            *picker.seen.lock().unwrap(),
            vec!["hub (last used)".to_string(), "ecr".to_string()]
        );
        Ok(())
    }

    #[async_std::test]
    async fn choose_propagates_cancellation() {
        let candidates = vec![Candidate::new("a", RegistryKind::Aws)];
        let err = RegistrySelector::new(&Aborts)
            .choose(&candidates, None, &CancelSignal::new())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let cancel = CancelSignal::new();
        cancel.cancel();
        let picker = Picker {
            pick: 0,
            seen: Mutex::new(Vec::new()),
        };
        let err = RegistrySelector::new(&picker)
            .choose(&candidates, None, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(picker.seen.lock().unwrap().is_empty());
    }

    #[async_std::test]
    async fn empty_candidates() {
        let err = RegistrySelector::new(&Aborts)
            .choose(&[], None, &CancelSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UiError::NoCandidates));
    }
}
