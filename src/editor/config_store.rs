//! Step configurations keyed by step id

use std::collections::BTreeMap;

use crate::types::{ConfigEntry, StepId, StepType};

/// Configuration values of configured steps.
///
/// Independent of the step collection: entries outlive the removal of their
/// step and are only ever created or replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    entries: BTreeMap<StepId, ConfigEntry>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole entry for `id`
    pub fn set(&mut self, id: StepId, entry: ConfigEntry) {
        tracing::debug!(step_id = %id, step_type = %entry.step_type(), "Step config stored");
        self.entries.insert(id, entry);
    }

    /// Stored entry for `id`, or the empty configuration of `step_type`
    pub fn get(&self, id: &StepId, step_type: StepType) -> ConfigEntry {
        self.entries
            .get(id)
            .cloned()
            .unwrap_or_else(|| ConfigEntry::empty(step_type))
    }

    /// Stored entry without defaulting
    pub fn entry(&self, id: &StepId) -> Option<&ConfigEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StepId, &ConfigEntry)> {
        self.entries.iter()
    }

    /// Owned copy of every entry
    pub fn snapshot(&self) -> BTreeMap<StepId, ConfigEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
