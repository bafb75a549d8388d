//! Per-step configuration values

use serde::{Deserialize, Serialize};

use super::step::StepType;

/// Input kind of a single field on a form step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FormFieldType {
    #[default]
    Text,
    Textarea,
    Email,
    Number,
    Phone,
    Url,
    Date,
    Time,
    Datetime,
    RangeDate,
    RangeTime,
    RangeDatetime,
    Choice,
    MultiChoice,
    Checkbox,
    File,
    Password,
    SectionHeading,
    HtmlNote,
}

impl FormFieldType {
    /// All field types in the order the type selector lists them
    pub fn all() -> &'static [FormFieldType] {
        &[
            FormFieldType::Text,
            FormFieldType::Textarea,
            FormFieldType::Email,
            FormFieldType::Number,
            FormFieldType::Phone,
            FormFieldType::Url,
            FormFieldType::Date,
            FormFieldType::Time,
            FormFieldType::Datetime,
            FormFieldType::RangeDate,
            FormFieldType::RangeTime,
            FormFieldType::RangeDatetime,
            FormFieldType::Choice,
            FormFieldType::MultiChoice,
            FormFieldType::Checkbox,
            FormFieldType::File,
            FormFieldType::Password,
            FormFieldType::SectionHeading,
            FormFieldType::HtmlNote,
        ]
    }

    /// Wire identifier (e.g. "multi_choice")
    pub fn key(&self) -> &'static str {
        match self {
            FormFieldType::Text => "text",
            FormFieldType::Textarea => "textarea",
            FormFieldType::Email => "email",
            FormFieldType::Number => "number",
            FormFieldType::Phone => "phone",
            FormFieldType::Url => "url",
            FormFieldType::Date => "date",
            FormFieldType::Time => "time",
            FormFieldType::Datetime => "datetime",
            FormFieldType::RangeDate => "range_date",
            FormFieldType::RangeTime => "range_time",
            FormFieldType::RangeDatetime => "range_datetime",
            FormFieldType::Choice => "choice",
            FormFieldType::MultiChoice => "multi_choice",
            FormFieldType::Checkbox => "checkbox",
            FormFieldType::File => "file",
            FormFieldType::Password => "password",
            FormFieldType::SectionHeading => "section_heading",
            FormFieldType::HtmlNote => "html_note",
        }
    }

    /// Label shown in the type selector
    pub fn display_name(&self) -> &'static str {
        match self {
            FormFieldType::Text => "Text",
            FormFieldType::Textarea => "Textarea",
            FormFieldType::Email => "Email",
            FormFieldType::Number => "Number",
            FormFieldType::Phone => "Phone",
            FormFieldType::Url => "URL",
            FormFieldType::Date => "Date",
            FormFieldType::Time => "Time",
            FormFieldType::Datetime => "DateTime",
            FormFieldType::RangeDate => "Date Range",
            FormFieldType::RangeTime => "Time Range",
            FormFieldType::RangeDatetime => "DateTime Range",
            FormFieldType::Choice => "Dropdown",
            FormFieldType::MultiChoice => "Multi-Select",
            FormFieldType::Checkbox => "Checkbox",
            FormFieldType::File => "File Upload",
            FormFieldType::Password => "Password",
            FormFieldType::SectionHeading => "Section Heading",
            FormFieldType::HtmlNote => "HTML Note",
        }
    }

    /// Whether the `choices` CSV is expected to be filled in
    pub fn uses_choices(&self) -> bool {
        matches!(self, FormFieldType::Choice | FormFieldType::MultiChoice)
    }
}

// Unrecognised values fall back to plain text input.
impl From<String> for FormFieldType {
    fn from(value: String) -> Self {
        FormFieldType::all()
            .iter()
            .copied()
            .find(|t| t.key() == value)
            .unwrap_or_default()
    }
}

/// One row of a form step's field list, identified only by its position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub field_type: FormFieldType,
    #[serde(default)]
    pub required: bool,
    /// Comma separated options for choice fields
    #[serde(default)]
    pub choices: String,
}

impl FieldSpec {
    /// Split the choices CSV into trimmed, non-empty options
    pub fn choice_list(&self) -> Vec<&str> {
        self.choices
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Delay in seconds, kept as entered
    #[serde(default)]
    pub delay: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default)]
    pub approver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// Uninterpreted condition expression
    #[serde(default)]
    pub logic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
}

/// Configuration of one step, tagged by step type.
///
/// Serializes as the bare per-type object; the owning step's type selects the
/// variant when reading (see [`ConfigEntry::from_value`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigEntry {
    Form(FormConfig),
    Email(EmailConfig),
    Timer(TimerConfig),
    Approval(ApprovalConfig),
    Condition(ConditionConfig),
    Webhook(WebhookConfig),
}

impl ConfigEntry {
    /// Empty configuration for an unconfigured step
    pub fn empty(step_type: StepType) -> Self {
        match step_type {
            StepType::Form => ConfigEntry::Form(FormConfig::default()),
            StepType::Email => ConfigEntry::Email(EmailConfig::default()),
            StepType::Timer => ConfigEntry::Timer(TimerConfig::default()),
            StepType::Approval => ConfigEntry::Approval(ApprovalConfig::default()),
            StepType::Condition => ConfigEntry::Condition(ConditionConfig::default()),
            StepType::Webhook => ConfigEntry::Webhook(WebhookConfig::default()),
        }
    }

    /// Parse a wire object as the configuration of a step of `step_type`
    pub fn from_value(
        step_type: StepType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match step_type {
            StepType::Form => ConfigEntry::Form(serde_json::from_value(value)?),
            StepType::Email => ConfigEntry::Email(serde_json::from_value(value)?),
            StepType::Timer => ConfigEntry::Timer(serde_json::from_value(value)?),
            StepType::Approval => ConfigEntry::Approval(serde_json::from_value(value)?),
            StepType::Condition => ConfigEntry::Condition(serde_json::from_value(value)?),
            StepType::Webhook => ConfigEntry::Webhook(serde_json::from_value(value)?),
        })
    }

    /// The step type this entry belongs to
    pub fn step_type(&self) -> StepType {
        match self {
            ConfigEntry::Form(_) => StepType::Form,
            ConfigEntry::Email(_) => StepType::Email,
            ConfigEntry::Timer(_) => StepType::Timer,
            ConfigEntry::Approval(_) => StepType::Approval,
            ConfigEntry::Condition(_) => StepType::Condition,
            ConfigEntry::Webhook(_) => StepType::Webhook,
        }
    }
}
