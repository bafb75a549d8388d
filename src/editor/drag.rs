//! Drag-transfer data exchanged between the gesture layer and the editor

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::StepType;

/// Where a drag gesture started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragOrigin {
    /// Palette template: dropping creates a new step
    Sidebar,
    /// Existing step on the canvas: pure reorder
    Canvas,
}

impl fmt::Display for DragOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragOrigin::Sidebar => f.write_str("sidebar"),
            DragOrigin::Canvas => f.write_str("canvas"),
        }
    }
}

/// Payload carried by one drag gesture.
///
/// The step type stays a raw identifier until the drop is handled, so a
/// template with an unknown type is rejected there instead of at drag start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTransfer {
    #[serde(rename = "type")]
    pub step_type: String,
    pub origin: DragOrigin,
}

impl DragTransfer {
    /// Drag of a palette template
    pub fn from_palette(step_type: StepType) -> Self {
        Self {
            step_type: step_type.key().to_string(),
            origin: DragOrigin::Sidebar,
        }
    }

    /// Drag of a step already on the canvas
    pub fn from_canvas(step_type: StepType) -> Self {
        Self {
            step_type: step_type.key().to_string(),
            origin: DragOrigin::Canvas,
        }
    }

    /// Step type to create when this transfer is dropped, if any
    pub fn creates(&self) -> Option<StepType> {
        if self.origin != DragOrigin::Sidebar {
            return None;
        }
        match StepType::from_str(&self.step_type) {
            Ok(step_type) => Some(step_type),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring drop of unknown step template");
                None
            }
        }
    }
}
