//! Core data types shared by the editor, the persister and the UI.

mod config_entry;
mod step;

pub use config_entry::{
    ApprovalConfig, ConditionConfig, ConfigEntry, EmailConfig, FieldSpec, FormConfig,
    FormFieldType, TimerConfig, WebhookConfig,
};
pub use step::{StepId, StepRecord, StepType, StepView, UnknownStepType};
