//! Step configuration dialog state.
//!
//! The modal is either closed or open on exactly one step. Opening reads the
//! step's stored configuration into a fixed per-type schema; submitting
//! validates required fields and replaces the stored entry wholesale.

use thiserror::Error;

use super::config_store::ConfigStore;
use crate::types::{
    ApprovalConfig, ConditionConfig, ConfigEntry, EmailConfig, FieldSpec, FormConfig, StepId,
    StepType, TimerConfig, WebhookConfig,
};

/// Input kind of a schema-bound modal field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    MultilineText,
    /// Whole number of at least 1
    PositiveInteger,
    /// E-mail address (not verified)
    Email,
    /// URL (not verified)
    Url,
}

/// One fixed field of a step's configuration dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Key of the value in the stored configuration
    pub name: &'static str,
    /// Label shown next to the input
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<&'static str>,
}

impl FieldSchema {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            placeholder: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }
}

/// The fields a step type exposes in its dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSchema {
    pub step_type: StepType,
    pub fields: Vec<FieldSchema>,
    /// Whether the dialog carries the dynamic list of form field rows
    pub has_field_rows: bool,
}

impl ModalSchema {
    pub fn for_type(step_type: StepType) -> Self {
        let fields = match step_type {
            StepType::Form => vec![FieldSchema::new("title", "Title", FieldKind::Text).required()],
            StepType::Email => vec![
                FieldSchema::new("subject", "Subject", FieldKind::Text).required(),
                FieldSchema::new("body", "Body", FieldKind::MultilineText),
            ],
            StepType::Timer => vec![FieldSchema::new(
                "delay",
                "Delay (in seconds)",
                FieldKind::PositiveInteger,
            )
            .required()],
            StepType::Approval => vec![FieldSchema::new(
                "approver",
                "Approver Email",
                FieldKind::Email,
            )],
            StepType::Condition => vec![FieldSchema::new(
                "logic",
                "Condition logic",
                FieldKind::Text,
            )
            .placeholder("e.g. amount > 10000")],
            StepType::Webhook => vec![FieldSchema::new("url", "Webhook URL", FieldKind::Url)],
        };

        Self {
            step_type,
            fields,
            has_field_rows: step_type == StepType::Form,
        }
    }
}

/// A schema field together with its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalField {
    pub schema: FieldSchema,
    pub value: String,
}

/// Errors raised by modal operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("no step configuration dialog is open")]
    NotOpen,
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a whole number of at least 1")]
    NotPositiveInteger { field: &'static str },
    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Dialog open on one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenModal {
    pub step_id: StepId,
    pub step_type: StepType,
    pub fields: Vec<ModalField>,
    /// Form field rows, in display order (form steps only)
    pub rows: Vec<FieldSpec>,
}

impl OpenModal {
    fn load(step_id: StepId, step_type: StepType, entry: ConfigEntry) -> Self {
        let schema = ModalSchema::for_type(step_type);
        let values = entry_values(&entry);

        let fields = schema
            .fields
            .into_iter()
            .map(|field| {
                let value = values
                    .iter()
                    .find(|(name, _)| *name == field.name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                ModalField {
                    schema: field,
                    value,
                }
            })
            .collect();

        let rows = match entry {
            ConfigEntry::Form(form) => form.fields,
            _ => Vec::new(),
        };

        Self {
            step_id,
            step_type,
            fields,
            rows,
        }
    }

    /// Dialog heading
    pub fn title(&self) -> String {
        format!("Configure {} Step", self.step_type)
    }

    pub fn has_field_rows(&self) -> bool {
        self.step_type == StepType::Form
    }

    /// Current value of a schema field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.schema.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), ModalError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.schema.name == name)
            .ok_or_else(|| ModalError::UnknownField(name.to_string()))?;
        field.value = value.into();
        Ok(())
    }

    /// Append a blank form field row
    pub fn add_field_row(&mut self) -> usize {
        self.rows.push(FieldSpec::default());
        self.rows.len() - 1
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut FieldSpec> {
        self.rows.get_mut(index)
    }

    /// Check required fields and numeric inputs
    pub fn validate(&self) -> Result<(), ModalError> {
        for field in &self.fields {
            let value = field.value.trim();
            if field.schema.required && value.is_empty() {
                return Err(ModalError::Required {
                    field: field.schema.label,
                });
            }
            if field.schema.kind == FieldKind::PositiveInteger
                && !value.is_empty()
                && !matches!(value.parse::<u64>(), Ok(n) if n >= 1)
            {
                return Err(ModalError::NotPositiveInteger {
                    field: field.schema.label,
                });
            }
        }
        Ok(())
    }

    /// Build the configuration entry from the collected values, as entered
    pub fn to_entry(&self) -> ConfigEntry {
        let get = |name: &str| self.value(name).unwrap_or_default().to_string();

        match self.step_type {
            StepType::Form => ConfigEntry::Form(FormConfig {
                title: get("title"),
                fields: self.rows.clone(),
            }),
            StepType::Email => ConfigEntry::Email(EmailConfig {
                subject: get("subject"),
                body: get("body"),
            }),
            StepType::Timer => ConfigEntry::Timer(TimerConfig {
                delay: get("delay"),
            }),
            StepType::Approval => ConfigEntry::Approval(ApprovalConfig {
                approver: get("approver"),
            }),
            StepType::Condition => ConfigEntry::Condition(ConditionConfig {
                logic: get("logic"),
            }),
            StepType::Webhook => ConfigEntry::Webhook(WebhookConfig { url: get("url") }),
        }
    }
}

/// Schema-bound values of an entry, by field name
fn entry_values(entry: &ConfigEntry) -> Vec<(&'static str, String)> {
    match entry {
        ConfigEntry::Form(c) => vec![("title", c.title.clone())],
        ConfigEntry::Email(c) => vec![("subject", c.subject.clone()), ("body", c.body.clone())],
        ConfigEntry::Timer(c) => vec![("delay", c.delay.clone())],
        ConfigEntry::Approval(c) => vec![("approver", c.approver.clone())],
        ConfigEntry::Condition(c) => vec![("logic", c.logic.clone())],
        ConfigEntry::Webhook(c) => vec![("url", c.url.clone())],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(OpenModal),
}

/// Mediates between a step and its stored configuration
#[derive(Debug, Default)]
pub struct ModalController {
    state: ModalState,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog on a step, replacing any dialog already open
    pub fn open(&mut self, step_id: StepId, step_type: StepType, store: &ConfigStore) -> &OpenModal {
        let entry = store.get(&step_id, step_type);
        tracing::debug!(step_id = %step_id, step_type = %step_type, "Opening step configuration");
        self.state = ModalState::Open(OpenModal::load(step_id, step_type, entry));
        match &self.state {
            ModalState::Open(modal) => modal,
            ModalState::Closed => unreachable!("modal was just opened"),
        }
    }

    /// Validate and store the dialog's values, then close it.
    ///
    /// On a validation error the dialog stays open and the store is untouched.
    pub fn submit(&mut self, store: &mut ConfigStore) -> Result<StepId, ModalError> {
        let modal = self.current().ok_or(ModalError::NotOpen)?;
        modal.validate()?;

        let entry = modal.to_entry();
        let step_id = modal.step_id.clone();
        store.set(step_id.clone(), entry);
        self.state = ModalState::Closed;
        Ok(step_id)
    }

    /// Close without storing anything. Returns whether a dialog was open.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = ModalState::Closed;
        was_open
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open(_))
    }

    pub fn current(&self) -> Option<&OpenModal> {
        match &self.state {
            ModalState::Open(modal) => Some(modal),
            ModalState::Closed => None,
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut OpenModal> {
        match &mut self.state {
            ModalState::Open(modal) => Some(modal),
            ModalState::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormFieldType;

    fn open_on(
        controller: &mut ModalController,
        store: &ConfigStore,
        id: &str,
        step_type: StepType,
    ) {
        controller.open(StepId::from(id), step_type, store);
    }

    #[test]
    fn test_schema_per_type() {
        let email = ModalSchema::for_type(StepType::Email);
        assert_eq!(email.fields.len(), 2);
        assert!(email.fields[0].required);
        assert_eq!(email.fields[1].kind, FieldKind::MultilineText);
        assert!(!email.has_field_rows);

        let form = ModalSchema::for_type(StepType::Form);
        assert!(form.has_field_rows);

        let condition = ModalSchema::for_type(StepType::Condition);
        assert_eq!(condition.fields[0].placeholder, Some("e.g. amount > 10000"));
        assert!(!condition.fields[0].required);
    }

    #[test]
    fn test_timer_submit_passes_value_through() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "temp-1", StepType::Timer);

        controller
            .current_mut()
            .unwrap()
            .set_value("delay", "30")
            .unwrap();
        let id = controller.submit(&mut store).unwrap();

        assert_eq!(id.as_str(), "temp-1");
        assert!(!controller.is_open());
        assert_eq!(
            store.get(&id, StepType::Timer),
            ConfigEntry::Timer(TimerConfig {
                delay: "30".to_string()
            })
        );
    }

    #[test]
    fn test_required_field_blocks_submit() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "temp-1", StepType::Email);

        let err = controller.submit(&mut store).unwrap_err();
        assert_eq!(err, ModalError::Required { field: "Subject" });
        assert!(controller.is_open());
        assert!(store.is_empty());
    }

    #[test]
    fn test_whitespace_does_not_satisfy_required() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "temp-1", StepType::Form);
        controller
            .current_mut()
            .unwrap()
            .set_value("title", "   ")
            .unwrap();
        assert!(controller.submit(&mut store).is_err());
    }

    #[test]
    fn test_timer_rejects_zero_and_text() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "t", StepType::Timer);

        for bad in ["0", "abc", "-5", "1.5"] {
            controller
                .current_mut()
                .unwrap()
                .set_value("delay", bad)
                .unwrap();
            assert_eq!(
                controller.submit(&mut store).unwrap_err(),
                ModalError::NotPositiveInteger {
                    field: "Delay (in seconds)"
                }
            );
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_leaves_store_untouched() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "w", StepType::Webhook);
        controller
            .current_mut()
            .unwrap()
            .set_value("url", "https://example.com/hook")
            .unwrap();

        assert!(controller.cancel());
        assert!(!controller.is_open());
        assert!(store.is_empty());
        assert!(!controller.cancel());
    }

    #[test]
    fn test_submit_when_closed() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        assert_eq!(controller.submit(&mut store), Err(ModalError::NotOpen));
    }

    #[test]
    fn test_open_loads_saved_values_and_rows() {
        let mut store = ConfigStore::new();
        store.set(
            StepId::from("f"),
            ConfigEntry::Form(FormConfig {
                title: "Onboarding".to_string(),
                fields: vec![FieldSpec {
                    label: "Start date".to_string(),
                    field_type: FormFieldType::Date,
                    required: true,
                    choices: String::new(),
                }],
            }),
        );

        let mut controller = ModalController::new();
        let modal = controller.open(StepId::from("f"), StepType::Form, &store);
        assert_eq!(modal.title(), "Configure form Step");
        assert_eq!(modal.value("title"), Some("Onboarding"));
        assert_eq!(modal.rows.len(), 1);
        assert_eq!(modal.rows[0].field_type, FormFieldType::Date);
    }

    #[test]
    fn test_form_rows_are_collected_in_order() {
        let mut store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "f", StepType::Form);

        let modal = controller.current_mut().unwrap();
        modal.set_value("title", "Request").unwrap();
        let first = modal.add_field_row();
        let second = modal.add_field_row();
        modal.row_mut(first).unwrap().label = "Amount".to_string();
        {
            let row = modal.row_mut(second).unwrap();
            row.label = "Category".to_string();
            row.field_type = FormFieldType::Choice;
            row.choices = "Travel,Meals".to_string();
            row.required = true;
        }

        controller.submit(&mut store).unwrap();

        match store.get(&StepId::from("f"), StepType::Form) {
            ConfigEntry::Form(form) => {
                assert_eq!(form.title, "Request");
                assert_eq!(form.fields.len(), 2);
                assert_eq!(form.fields[0].label, "Amount");
                assert_eq!(form.fields[0].field_type, FormFieldType::Text);
                assert!(!form.fields[0].required);
                assert_eq!(form.fields[1].choices, "Travel,Meals");
            }
            other => panic!("Expected form config, got {:?}", other),
        }
    }

    #[test]
    fn test_set_unknown_field() {
        let store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "a", StepType::Approval);
        let err = controller
            .current_mut()
            .unwrap()
            .set_value("delay", "3")
            .unwrap_err();
        assert_eq!(err, ModalError::UnknownField("delay".to_string()));
    }

    #[test]
    fn test_reopen_replaces_open_dialog() {
        let store = ConfigStore::new();
        let mut controller = ModalController::new();
        open_on(&mut controller, &store, "a", StepType::Approval);
        open_on(&mut controller, &store, "b", StepType::Condition);

        let modal = controller.current().unwrap();
        assert_eq!(modal.step_id.as_str(), "b");
        assert_eq!(modal.step_type, StepType::Condition);
    }
}
