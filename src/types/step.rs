//! Step identity and step type definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Opaque identity of a step within an editor session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Stored workflows come back with database ids, which are JSON numbers.
impl<'de> Deserialize<'de> for StepId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => StepId(s),
            Repr::Number(n) => StepId(n.to_string()),
        })
    }
}

/// The six kinds of workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Form,
    Email,
    Timer,
    Approval,
    Condition,
    Webhook,
}

impl StepType {
    /// All step types in palette order
    pub fn all() -> &'static [StepType] {
        &[
            StepType::Form,
            StepType::Email,
            StepType::Timer,
            StepType::Approval,
            StepType::Condition,
            StepType::Webhook,
        ]
    }

    /// Wire identifier (e.g. "form")
    pub fn key(&self) -> &'static str {
        match self {
            StepType::Form => "form",
            StepType::Email => "email",
            StepType::Timer => "timer",
            StepType::Approval => "approval",
            StepType::Condition => "condition",
            StepType::Webhook => "webhook",
        }
    }

    /// Identifier with its first letter capitalized, used in step labels
    pub fn capitalized(&self) -> &'static str {
        match self {
            StepType::Form => "Form",
            StepType::Email => "Email",
            StepType::Timer => "Timer",
            StepType::Approval => "Approval",
            StepType::Condition => "Condition",
            StepType::Webhook => "Webhook",
        }
    }

    /// Template name shown in the palette
    pub fn display_name(&self) -> &'static str {
        match self {
            StepType::Form => "Form Input",
            StepType::Email => "Send Email",
            StepType::Timer => "Delay Timer",
            StepType::Approval => "Approval Step",
            StepType::Condition => "Conditional Branch",
            StepType::Webhook => "Webhook Call",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error for step type identifiers outside the known set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step type: {0}")]
pub struct UnknownStepType(pub String);

impl FromStr for StepType {
    type Err = UnknownStepType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepType::all()
            .iter()
            .copied()
            .find(|t| t.key() == s)
            .ok_or_else(|| UnknownStepType(s.to_string()))
    }
}

/// A step as held by the collection. Its order is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub id: StepId,
    pub step_type: StepType,
}

/// A step read out of the collection together with its derived 0-based order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub id: StepId,
    pub step_type: StepType,
    pub order: usize,
}
