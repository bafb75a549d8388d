//! Editor session: owns the canvas state and applies user commands

use uuid::Uuid;

use super::collection::StepCollection;
use super::config_store::ConfigStore;
use super::drag::DragTransfer;
use super::modal::{ModalController, ModalError, OpenModal};
use super::EditorError;
use crate::api::payload::{SavePayload, WorkflowSnapshot};
use crate::types::{ConfigEntry, StepId, StepType, StepView};

/// A user gesture, expressed as a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A drag ended over the canvas
    Drop(DragTransfer),
    Insert(StepType),
    Remove(StepId),
    /// A canvas reorder gesture ended with this id order
    Reorder(Vec<StepId>),
    OpenModal(StepId),
    SetField { name: String, value: String },
    AddFieldRow,
    SubmitModal,
    CancelModal,
}

/// What a command changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted(StepView),
    Removed(StepId),
    Reordered,
    ModalOpened(StepId),
    FieldSet,
    FieldRowAdded(usize),
    ConfigSaved(StepId),
    ModalClosed,
    /// Nothing changed (e.g. canvas drop, delete of an unknown step)
    Unchanged,
}

/// Summary of loading a stored workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub steps: usize,
    pub configs: usize,
    /// Steps dropped because their type is not one of the known step types
    pub skipped_steps: usize,
    /// Configurations dropped because they did not match their step's type
    pub skipped_configs: usize,
}

/// The state of one editing session.
///
/// Holds the step collection, the configuration store and the modal. All
/// mutations go through [`EditorSession::apply`] (or its typed shortcuts).
#[derive(Debug)]
pub struct EditorSession {
    id: Uuid,
    steps: StepCollection,
    configs: ConfigStore,
    modal: ModalController,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "Editor session created");
        Self {
            id,
            steps: StepCollection::new(),
            configs: ConfigStore::new(),
            modal: ModalController::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn steps(&self) -> &StepCollection {
        &self.steps
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalController {
        &mut self.modal
    }

    /// Apply one command
    pub fn apply(&mut self, command: Command) -> Result<Outcome, EditorError> {
        match command {
            Command::Drop(transfer) => Ok(self
                .handle_drop(&transfer)
                .map_or(Outcome::Unchanged, Outcome::Inserted)),
            Command::Insert(step_type) => Ok(Outcome::Inserted(self.steps.insert(step_type))),
            Command::Remove(id) => Ok(self.remove(&id)),
            Command::Reorder(ids) => {
                self.steps.reorder(&ids)?;
                Ok(Outcome::Reordered)
            }
            Command::OpenModal(id) => {
                self.open_modal(&id)?;
                Ok(Outcome::ModalOpened(id))
            }
            Command::SetField { name, value } => {
                self.open_modal_mut()?.set_value(&name, value)?;
                Ok(Outcome::FieldSet)
            }
            Command::AddFieldRow => Ok(Outcome::FieldRowAdded(
                self.open_modal_mut()?.add_field_row(),
            )),
            Command::SubmitModal => Ok(Outcome::ConfigSaved(
                self.modal.submit(&mut self.configs)?,
            )),
            Command::CancelModal => {
                self.modal.cancel();
                Ok(Outcome::ModalClosed)
            }
        }
    }

    /// Handle a drop on the canvas; only palette drags create a step
    pub fn handle_drop(&mut self, transfer: &DragTransfer) -> Option<StepView> {
        let step_type = transfer.creates()?;
        Some(self.steps.insert(step_type))
    }

    fn remove(&mut self, id: &StepId) -> Outcome {
        if !self.steps.remove(id) {
            return Outcome::Unchanged;
        }
        // A dialog left open on a deleted step would store an orphan entry on submit
        if self.modal.current().is_some_and(|m| &m.step_id == id) {
            self.modal.cancel();
        }
        Outcome::Removed(id.clone())
    }

    fn open_modal(&mut self, id: &StepId) -> Result<(), EditorError> {
        let step_type = self
            .steps
            .get(id)
            .map(|record| record.step_type)
            .ok_or_else(|| EditorError::UnknownStep(id.clone()))?;
        self.modal.open(id.clone(), step_type, &self.configs);
        Ok(())
    }

    fn open_modal_mut(&mut self) -> Result<&mut OpenModal, EditorError> {
        self.modal
            .current_mut()
            .ok_or(EditorError::Modal(ModalError::NotOpen))
    }

    /// Snapshot of the current steps and configurations for saving
    pub fn save_payload(&self) -> SavePayload {
        SavePayload::build(&self.steps, &self.configs)
    }

    /// Replace the session's steps and configurations with a stored workflow.
    ///
    /// Steps are placed by their stored order. On error the session is left
    /// unchanged.
    pub fn restore(&mut self, snapshot: WorkflowSnapshot) -> Result<RestoreReport, EditorError> {
        let mut report = RestoreReport::default();
        let mut steps = StepCollection::new();
        let mut configs = ConfigStore::new();

        let mut stored = snapshot.steps;
        stored.sort_by_key(|s| s.order);

        for step in stored {
            let step_type = match step.step_type.parse::<StepType>() {
                Ok(t) => t,
                Err(err) => {
                    tracing::warn!(step_id = %step.id, error = %err, "Skipping stored step");
                    report.skipped_steps += 1;
                    continue;
                }
            };
            steps.insert_with_id(step.id, step_type)?;
            report.steps += 1;
        }

        let mut raw_configs = snapshot.configs;
        for view in steps.list() {
            let Some(value) = raw_configs.remove(view.id.as_str()) else {
                continue;
            };
            match ConfigEntry::from_value(view.step_type, value) {
                Ok(entry) => {
                    configs.set(view.id, entry);
                    report.configs += 1;
                }
                Err(err) => {
                    tracing::warn!(step_id = %view.id, error = %err, "Skipping stored config");
                    report.skipped_configs += 1;
                }
            }
        }
        report.skipped_configs += raw_configs.len();

        self.steps = steps;
        self.configs = configs;
        self.modal.cancel();

        tracing::info!(
            session = %self.id,
            steps = report.steps,
            configs = report.configs,
            skipped_steps = report.skipped_steps,
            skipped_configs = report.skipped_configs,
            "Workflow restored"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payload::StoredStep;
    use crate::editor::drag::DragOrigin;
    use crate::types::TimerConfig;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn labels(session: &EditorSession) -> Vec<String> {
        session
            .steps()
            .labels()
            .into_iter()
            .map(|(_, l)| l)
            .collect()
    }

    #[test]
    fn test_drop_from_palette_inserts() {
        let mut session = EditorSession::new();
        let outcome = session
            .apply(Command::Drop(DragTransfer::from_palette(StepType::Form)))
            .unwrap();
        assert!(matches!(outcome, Outcome::Inserted(_)));
        assert_eq!(labels(&session), vec!["Form Step 1"]);
    }

    #[test]
    fn test_drop_from_canvas_is_ignored() {
        let mut session = EditorSession::new();
        let outcome = session
            .apply(Command::Drop(DragTransfer {
                step_type: "form".to_string(),
                origin: DragOrigin::Canvas,
            }))
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(session.steps().is_empty());
    }

    #[test]
    fn test_open_unknown_step_fails() {
        let mut session = EditorSession::new();
        let err = session
            .apply(Command::OpenModal(StepId::from("nope")))
            .unwrap_err();
        assert!(matches!(err, EditorError::UnknownStep(_)));
        assert!(!session.modal().is_open());
    }

    #[test]
    fn test_modal_commands_round() {
        let mut session = EditorSession::new();
        let Outcome::Inserted(step) = session.apply(Command::Insert(StepType::Timer)).unwrap()
        else {
            panic!("expected insert");
        };

        session.apply(Command::OpenModal(step.id.clone())).unwrap();
        session
            .apply(Command::SetField {
                name: "delay".to_string(),
                value: "30".to_string(),
            })
            .unwrap();
        let outcome = session.apply(Command::SubmitModal).unwrap();

        assert_eq!(outcome, Outcome::ConfigSaved(step.id.clone()));
        assert_eq!(
            session.configs().entry(&step.id),
            Some(&ConfigEntry::Timer(TimerConfig {
                delay: "30".to_string()
            }))
        );
    }

    #[test]
    fn test_field_commands_need_open_modal() {
        let mut session = EditorSession::new();
        assert!(session.apply(Command::AddFieldRow).is_err());
        assert!(session
            .apply(Command::SetField {
                name: "title".to_string(),
                value: "x".to_string(),
            })
            .is_err());
    }

    #[test]
    fn test_remove_keeps_config_and_closes_its_modal() {
        let mut session = EditorSession::new();
        let step = session.steps.insert(StepType::Timer);
        session.configs.set(
            step.id.clone(),
            ConfigEntry::Timer(TimerConfig {
                delay: "5".to_string(),
            }),
        );
        session.apply(Command::OpenModal(step.id.clone())).unwrap();

        let outcome = session.apply(Command::Remove(step.id.clone())).unwrap();
        assert_eq!(outcome, Outcome::Removed(step.id.clone()));
        assert!(!session.modal().is_open());
        assert!(session.configs().contains(&step.id));
    }

    #[test]
    fn test_remove_unknown_is_unchanged() {
        let mut session = EditorSession::new();
        let outcome = session.apply(Command::Remove(StepId::from("x"))).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_restore_orders_and_parses_configs() {
        let mut session = EditorSession::new();
        session.apply(Command::Insert(StepType::Webhook)).unwrap();

        let snapshot = WorkflowSnapshot {
            steps: vec![
                StoredStep {
                    id: StepId::from("12"),
                    order: 2,
                    step_type: "email".to_string(),
                    name: "Email Step 1".to_string(),
                },
                StoredStep {
                    id: StepId::from("11"),
                    order: 1,
                    step_type: "timer".to_string(),
                    name: "Timer Step 1".to_string(),
                },
                StoredStep {
                    id: StepId::from("13"),
                    order: 3,
                    step_type: "sms".to_string(),
                    name: "Sms Step 1".to_string(),
                },
            ],
            configs: BTreeMap::from([
                ("11".to_string(), json!({"delay": "60"})),
                ("12".to_string(), json!({"subject": "Welcome"})),
                ("13".to_string(), json!({"text": "hi"})),
            ]),
        };

        let report = session.restore(snapshot).unwrap();
        assert_eq!(report.steps, 2);
        assert_eq!(report.configs, 2);
        assert_eq!(report.skipped_steps, 1);
        assert_eq!(report.skipped_configs, 1);
        assert_eq!(labels(&session), vec!["Timer Step 1", "Email Step 1"]);

        // New steps never collide with restored ids
        let Outcome::Inserted(view) = session.apply(Command::Insert(StepType::Timer)).unwrap()
        else {
            panic!("expected insert");
        };
        assert!(view.id.as_str().starts_with("temp-"));
    }

    #[test]
    fn test_restore_with_duplicate_ids_leaves_session() {
        let mut session = EditorSession::new();
        let existing = session.steps.insert(StepType::Form);

        let step = |order| StoredStep {
            id: StepId::from("5"),
            order,
            step_type: "form".to_string(),
            name: String::new(),
        };
        let snapshot = WorkflowSnapshot {
            steps: vec![step(1), step(2)],
            configs: BTreeMap::new(),
        };

        assert!(matches!(
            session.restore(snapshot),
            Err(EditorError::DuplicateStep(_))
        ));
        assert_eq!(session.steps().ids(), vec![existing.id]);
    }
}
