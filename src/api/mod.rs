//! Persistence of the workflow to the remote builder endpoint
//!
//! - [`payload`]: request and response bodies
//! - [`WorkflowBackend`]: the seam the editor saves through
//! - [`spawn_save`]: fire a save without blocking the UI loop

mod backend;
mod error;
pub mod payload;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

pub use backend::{HttpBackend, WorkflowBackend};
pub use error::SaveError;
pub use payload::{PayloadStep, SavePayload, SaveResponse, StoredStep, WorkflowSnapshot};

/// Result of one background save, delivered back to the UI loop
#[derive(Debug)]
pub struct SaveReport {
    /// Number of steps in the snapshot that was sent
    pub steps: usize,
    pub result: Result<(), SaveError>,
}

impl SaveReport {
    /// Notification line for the status bar
    pub fn notification(&self) -> &'static str {
        match &self.result {
            Ok(()) => "✅ Workflow saved!",
            Err(SaveError::Rejected { .. }) => "❌ Failed to save workflow.",
            Err(_) => "❌ Save failed.",
        }
    }
}

/// Send `payload` in the background and report the outcome on `tx`.
///
/// Each call sends its own snapshot; concurrent saves are not coalesced.
pub fn spawn_save(
    backend: Arc<dyn WorkflowBackend>,
    payload: SavePayload,
    tx: UnboundedSender<SaveReport>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let steps = payload.steps.len();
        let result = backend.save(&payload).await;
        if let Err(e) = &result {
            tracing::error!(url = %backend.endpoint(), error = %e, "Workflow save failed");
        }
        // Receiver gone means the editor already quit
        if tx.send(SaveReport { steps, result }).is_err() {
            tracing::debug!("Save finished after the editor closed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records payloads and answers with a fixed outcome
    struct RecordingBackend {
        reject: bool,
        sent: Mutex<Vec<SavePayload>>,
    }

    #[async_trait]
    impl WorkflowBackend for RecordingBackend {
        fn endpoint(&self) -> &str {
            "memory://workflow"
        }

        async fn save(&self, payload: &SavePayload) -> Result<(), SaveError> {
            self.sent.lock().unwrap().push(payload.clone());
            if self.reject {
                Err(SaveError::Rejected {
                    url: self.endpoint().to_string(),
                    status: 400,
                    message: Some("bad".to_string()),
                })
            } else {
                Ok(())
            }
        }

        async fn fetch(&self) -> Result<WorkflowSnapshot, SaveError> {
            Ok(WorkflowSnapshot::default())
        }
    }

    fn empty_payload() -> SavePayload {
        SavePayload {
            steps: Vec::new(),
            configs: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_spawn_save_reports_success() {
        let backend = Arc::new(RecordingBackend {
            reject: false,
            sent: Mutex::new(Vec::new()),
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        spawn_save(backend.clone(), empty_payload(), tx).await.unwrap();

        let report = rx.recv().await.unwrap();
        assert!(report.result.is_ok());
        assert_eq!(report.notification(), "✅ Workflow saved!");
        assert_eq!(backend.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_save_reports_rejection() {
        let backend = Arc::new(RecordingBackend {
            reject: true,
            sent: Mutex::new(Vec::new()),
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        spawn_save(backend, empty_payload(), tx).await.unwrap();

        let report = rx.recv().await.unwrap();
        assert_eq!(report.notification(), "❌ Failed to save workflow.");
    }

    #[tokio::test]
    async fn test_each_save_sends_its_own_snapshot() {
        let backend = Arc::new(RecordingBackend {
            reject: false,
            sent: Mutex::new(Vec::new()),
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let first = spawn_save(backend.clone(), empty_payload(), tx.clone());
        let second = spawn_save(backend.clone(), empty_payload(), tx);
        first.await.unwrap();
        second.await.unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        assert_eq!(backend.sent.lock().unwrap().len(), 2);
    }
}
