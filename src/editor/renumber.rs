//! Per-type display numbering of steps.
//!
//! Labels are derived from the current order only, so every call starts from
//! fresh counters: after any insert, delete or reorder each type is numbered
//! `1..=k` with no gaps.

use std::collections::HashMap;

use crate::types::{StepId, StepType, StepView};

/// Format the label of the `ordinal`-th step of `step_type` (1-based)
pub fn display_label(step_type: StepType, ordinal: usize) -> String {
    format!("{} Step {}", step_type.capitalized(), ordinal)
}

/// Compute labels for `steps` in the given order
pub fn labels_for<'a, I>(steps: I) -> Vec<(StepId, String)>
where
    I: IntoIterator<Item = &'a StepView>,
{
    let mut counters: HashMap<StepType, usize> = HashMap::new();

    steps
        .into_iter()
        .map(|step| {
            let counter = counters.entry(step.step_type).or_insert(0);
            *counter += 1;
            (step.id.clone(), display_label(step.step_type, *counter))
        })
        .collect()
}

/// Same as [`labels_for`], keyed by step id
pub fn label_map<'a, I>(steps: I) -> HashMap<StepId, String>
where
    I: IntoIterator<Item = &'a StepView>,
{
    labels_for(steps).into_iter().collect()
}
