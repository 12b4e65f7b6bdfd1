use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::store::TargetStore;
use super::types::{ProbeResult, Target, Tick};
use crate::error::StoreError;

/// Characters that may never appear in a host name
const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// Whether `name` is acceptable as a target identifier.
///
/// A leading `-` is refused since the name is handed to external commands.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(char::is_whitespace)
        && !name.contains(PATH_SEPARATORS)
}

/// Ordered collection of monitored targets, backed by a [`TargetStore`]
pub struct Registry<S: TargetStore> {
    targets: Vec<Target>,
    store: S,
    check_interval: Duration,
}

impl<S: TargetStore> Registry<S> {
    /// Create an empty registry without reading the store
    pub fn new(store: S, check_interval: Duration) -> Self {
        Self { targets: Vec::new(), store, check_interval }
    }

    /// Build a registry from the persisted list.
    ///
    /// Lines are trimmed; blank, malformed and duplicate lines are skipped.
    /// Every loaded target is due immediately. A store that cannot be read
    /// is logged and treated as empty.
    pub fn load(store: S, check_interval: Duration) -> Self {
        let mut registry = Self::new(store, check_interval);
        for target in registry.load_all() {
            if registry.get(&target.name).is_none() {
                registry.targets.push(target);
            }
        }
        info!(count = registry.targets.len(), "Loaded targets");
        registry
    }

    /// Read targets from the store without touching in-memory state
    pub fn load_all(&self) -> Vec<Target> {
        let lines = match self.store.load_names() {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Continuing with an empty target list: {}", e);
                return Vec::new();
            }
        };

        lines
            .iter()
            .map(|line| line.trim())
            .filter(|name| {
                let valid = is_valid_name(name);
                if !valid && !name.is_empty() {
                    debug!(%name, "Skipping malformed stored target");
                }
                valid
            })
            .map(Target::new)
            .collect()
    }

    /// Overwrite the store with the current name list
    pub fn save_all(&self) -> Result<(), StoreError> {
        let names: Vec<&str> = self.targets.iter().map(|t| t.name.as_str()).collect();
        self.store.save_names(&names)?;
        debug!(count = names.len(), "Saved targets");
        Ok(())
    }

    /// Insert the configured defaults when nothing was loaded.
    ///
    /// Returns true when defaults were added; the caller persists them.
    pub fn seed_defaults<I, T>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        if !self.targets.is_empty() {
            return false;
        }
        let mut added = false;
        for name in names {
            added |= self.insert(name.as_ref());
        }
        added
    }

    /// Append a new target, due immediately.
    ///
    /// Returns false and leaves the registry untouched if the name is
    /// invalid or already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if !is_valid_name(name) || self.get(name).is_some() {
            return false;
        }
        self.targets.push(Target::new(name));
        true
    }

    /// Targets whose deadline has arrived, in registry order
    pub fn due_now(&self, now: Instant) -> Vec<&Target> {
        self.targets.iter().filter(|t| t.is_due(now)).collect()
    }

    /// Store a probe outcome for `name` observed at `now`.
    ///
    /// Returns false if no such target exists.
    pub fn record_result(&mut self, name: &str, result: ProbeResult, now: Tick) -> bool {
        let interval = self.check_interval;
        match self.targets.iter_mut().find(|t| t.name == name) {
            Some(target) => {
                target.apply(result, now, interval);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }
}
