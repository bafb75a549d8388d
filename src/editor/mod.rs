//! Step sequencing and configuration state of the workflow editor.

pub mod collection;
pub mod config_store;
pub mod drag;
pub mod modal;
pub mod renumber;
pub mod session;

use thiserror::Error;

use crate::types::StepId;

pub use collection::{StepCollection, StepIdGenerator};
pub use config_store::ConfigStore;
pub use drag::{DragOrigin, DragTransfer};
pub use modal::{
    FieldKind, FieldSchema, ModalController, ModalError, ModalField, ModalSchema, ModalState,
    OpenModal,
};
pub use session::{Command, EditorSession, Outcome, RestoreReport};

/// Errors from applying editor commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("reorder must list each of the {expected} steps exactly once (got {received} ids)")]
    ReorderMismatch { expected: usize, received: usize },
    #[error("step '{0}' already exists")]
    DuplicateStep(StepId),
    #[error("step '{0}' not found")]
    UnknownStep(StepId),
    #[error(transparent)]
    Modal(#[from] ModalError),
}
