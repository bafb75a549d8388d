//! Save request body and stored-workflow response shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editor::{renumber, ConfigStore, StepCollection};
use crate::types::{ConfigEntry, StepId, StepType};

/// One step in the save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadStep {
    pub id: StepId,
    /// 1-based position on the canvas
    pub order: usize,
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Display label at save time (e.g. "Form Step 2")
    pub name: String,
}

/// Body of the save request: the full canvas plus every stored configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePayload {
    pub steps: Vec<PayloadStep>,
    pub configs: BTreeMap<StepId, ConfigEntry>,
}

impl SavePayload {
    /// Snapshot the collection and store as they are now
    pub fn build(steps: &StepCollection, configs: &ConfigStore) -> Self {
        let views = steps.list();
        let labels = renumber::labels_for(&views);

        let steps = views
            .into_iter()
            .zip(labels)
            .map(|(view, (_, name))| PayloadStep {
                order: view.order + 1,
                id: view.id,
                step_type: view.step_type,
                name,
            })
            .collect();

        Self {
            steps,
            configs: configs.snapshot(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Server reply to a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A step as returned by the server. The type is kept raw so unknown
/// types can be skipped instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredStep {
    pub id: StepId,
    #[serde(default)]
    pub order: i64,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub name: String,
}

/// Stored workflow, same shape as [`SavePayload`] with untyped configs
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WorkflowSnapshot {
    #[serde(default)]
    pub steps: Vec<StoredStep>,
    #[serde(default)]
    pub configs: BTreeMap<String, serde_json::Value>,
}
