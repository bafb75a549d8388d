//! Ordered collection of the steps on the canvas

use std::collections::HashSet;

use super::renumber;
use super::EditorError;
use crate::types::{StepId, StepRecord, StepType, StepView};

/// Monotonic source of session-unique step ids (`temp-1`, `temp-2`, ...)
#[derive(Debug, Default)]
pub struct StepIdGenerator {
    next: u64,
}

impl StepIdGenerator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Next id not accepted by `is_taken`
    pub fn next_id(&mut self, is_taken: impl Fn(&StepId) -> bool) -> StepId {
        loop {
            self.next += 1;
            let candidate = StepId::new(format!("temp-{}", self.next));
            if !is_taken(&candidate) {
                return candidate;
            }
        }
    }
}

/// The steps of the workflow in canvas order.
///
/// A step's order is its position; it is never stored on the record.
#[derive(Debug, Default)]
pub struct StepCollection {
    steps: Vec<StepRecord>,
    ids: StepIdGenerator,
}

impl StepCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new step of `step_type` with a fresh id
    pub fn insert(&mut self, step_type: StepType) -> StepView {
        let steps = &self.steps;
        let id = self
            .ids
            .next_id(|candidate| steps.iter().any(|s| &s.id == candidate));
        self.push(id, step_type)
    }

    /// Append a step that already has an id (e.g. restored from the server)
    pub fn insert_with_id(
        &mut self,
        id: StepId,
        step_type: StepType,
    ) -> Result<StepView, EditorError> {
        if self.contains(&id) {
            return Err(EditorError::DuplicateStep(id));
        }
        Ok(self.push(id, step_type))
    }

    fn push(&mut self, id: StepId, step_type: StepType) -> StepView {
        let order = self.steps.len();
        tracing::debug!(step_id = %id, step_type = %step_type, order, "Step inserted");
        self.steps.push(StepRecord {
            id: id.clone(),
            step_type,
        });
        StepView {
            id,
            step_type,
            order,
        }
    }

    /// Remove a step. Unknown ids are ignored so late or repeated deletes are harmless.
    pub fn remove(&mut self, id: &StepId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.steps.remove(index);
                tracing::debug!(step_id = %id, "Step removed");
                true
            }
            None => {
                tracing::debug!(step_id = %id, "Ignoring removal of unknown step");
                false
            }
        }
    }

    /// Rearrange the steps to follow `new_order`.
    ///
    /// `new_order` must contain every current id exactly once; otherwise the
    /// collection is left untouched.
    pub fn reorder(&mut self, new_order: &[StepId]) -> Result<(), EditorError> {
        let mismatch = || EditorError::ReorderMismatch {
            expected: self.steps.len(),
            received: new_order.len(),
        };

        if new_order.len() != self.steps.len() {
            return Err(mismatch());
        }

        let mut seen = HashSet::with_capacity(new_order.len());
        let mut reordered = Vec::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(id) {
                return Err(mismatch());
            }
            match self.get(id) {
                Some(record) => reordered.push(record.clone()),
                None => return Err(mismatch()),
            }
        }

        self.steps = reordered;
        tracing::debug!(count = self.steps.len(), "Steps reordered");
        Ok(())
    }

    /// Snapshot of the steps in current order
    pub fn list(&self) -> Vec<StepView> {
        self.steps
            .iter()
            .enumerate()
            .map(|(order, record)| StepView {
                id: record.id.clone(),
                step_type: record.step_type,
                order,
            })
            .collect()
    }

    /// Display labels for the current order
    pub fn labels(&self) -> Vec<(StepId, String)> {
        renumber::labels_for(&self.list())
    }

    /// Display label of one step
    pub fn label_of(&self, id: &StepId) -> Option<String> {
        self.labels()
            .into_iter()
            .find(|(step_id, _)| step_id == id)
            .map(|(_, label)| label)
    }

    pub fn ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id.clone()).collect()
    }

    pub fn get(&self, id: &StepId) -> Option<&StepRecord> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn position(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
