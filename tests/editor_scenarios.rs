//! End-to-end editor scenarios driven through the public command API

use std::collections::HashMap;

use async_trait::async_trait;

use workflow_builder::api::{SaveError, SavePayload, WorkflowBackend, WorkflowSnapshot};
use workflow_builder::editor::{
    Command, DragTransfer, EditorError, EditorSession, Outcome, StepCollection,
};
use workflow_builder::types::{ConfigEntry, StepId, StepType, TimerConfig};

fn insert(session: &mut EditorSession, step_type: StepType) -> StepId {
    match session.apply(Command::Insert(step_type)) {
        Ok(Outcome::Inserted(view)) => view.id,
        other => panic!("Expected insert, got {:?}", other),
    }
}

fn labels(session: &EditorSession) -> Vec<String> {
    session
        .steps()
        .labels()
        .into_iter()
        .map(|(_, label)| label)
        .collect()
}

/// Every type's labels must read 1..=k in canvas order
fn assert_contiguous(steps: &StepCollection) {
    let mut seen: HashMap<StepType, usize> = HashMap::new();
    for (view, (_, label)) in steps.list().iter().zip(steps.labels()) {
        let n = seen.entry(view.step_type).or_insert(0);
        *n += 1;
        assert_eq!(label, format!("{} Step {}", view.step_type.capitalized(), n));
    }
}

#[test]
fn test_insert_remove_renumbers_per_type() {
    let mut session = EditorSession::new();
    let first_form = insert(&mut session, StepType::Form);
    insert(&mut session, StepType::Email);
    insert(&mut session, StepType::Form);
    assert_eq!(
        labels(&session),
        vec!["Form Step 1", "Email Step 1", "Form Step 2"]
    );

    session.apply(Command::Remove(first_form)).unwrap();
    assert_eq!(labels(&session), vec!["Email Step 1", "Form Step 1"]);
}

#[test]
fn test_labels_stay_contiguous_over_mixed_operations() {
    let mut session = EditorSession::new();
    // Deterministic pseudo-random walk over insert/remove/reorder
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: usize| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % bound as u64) as usize
    };

    for _ in 0..300 {
        match next(3) {
            0 => {
                let step_type = StepType::all()[next(StepType::all().len())];
                session.apply(Command::Insert(step_type)).unwrap();
            }
            1 if !session.steps().is_empty() => {
                let ids = session.steps().ids();
                let id = ids[next(ids.len())].clone();
                session.apply(Command::Remove(id)).unwrap();
            }
            _ if session.steps().len() > 1 => {
                let mut ids = session.steps().ids();
                let a = next(ids.len());
                let b = next(ids.len());
                ids.swap(a, b);
                session.apply(Command::Reorder(ids)).unwrap();
            }
            _ => {}
        }
        assert_contiguous(session.steps());
    }
}

#[test]
fn test_rapid_inserts_get_distinct_ids() {
    let mut session = EditorSession::new();
    let a = insert(&mut session, StepType::Webhook);
    let b = insert(&mut session, StepType::Webhook);
    assert_ne!(a, b);
}

#[test]
fn test_reorder_with_current_order_is_noop() {
    let mut session = EditorSession::new();
    insert(&mut session, StepType::Form);
    insert(&mut session, StepType::Timer);
    let before = session.steps().list();

    session
        .apply(Command::Reorder(session.steps().ids()))
        .unwrap();
    assert_eq!(session.steps().list(), before);
}

#[test]
fn test_reorder_with_wrong_membership_changes_nothing() {
    let mut session = EditorSession::new();
    let a = insert(&mut session, StepType::Form);
    insert(&mut session, StepType::Timer);
    let before = session.steps().ids();

    let err = session
        .apply(Command::Reorder(vec![a, StepId::from("ghost")]))
        .unwrap_err();
    assert!(matches!(err, EditorError::ReorderMismatch { .. }));
    assert_eq!(session.steps().ids(), before);
}

#[test]
fn test_canvas_origin_drop_never_creates() {
    let mut session = EditorSession::new();
    let outcome = session
        .apply(Command::Drop(DragTransfer::from_canvas(StepType::Email)))
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);

    session
        .apply(Command::Drop(DragTransfer::from_palette(StepType::Email)))
        .unwrap();
    assert_eq!(labels(&session), vec!["Email Step 1"]);
}

#[test]
fn test_timer_delay_is_stored_as_entered() {
    let mut session = EditorSession::new();
    let timer = insert(&mut session, StepType::Timer);

    session.apply(Command::OpenModal(timer.clone())).unwrap();
    session
        .apply(Command::SetField {
            name: "delay".to_string(),
            value: "30".to_string(),
        })
        .unwrap();
    session.apply(Command::SubmitModal).unwrap();

    assert_eq!(
        session.configs().entry(&timer),
        Some(&ConfigEntry::Timer(TimerConfig {
            delay: "30".to_string()
        }))
    );
    let json = serde_json::to_value(session.save_payload()).unwrap();
    assert_eq!(json["configs"][timer.as_str()]["delay"], "30");
}

#[test]
fn test_resubmit_overwrites_wholesale() {
    let mut session = EditorSession::new();
    let email = insert(&mut session, StepType::Email);

    for (subject, body) in [("First", "Long body"), ("Second", "")] {
        session.apply(Command::OpenModal(email.clone())).unwrap();
        for (name, value) in [("subject", subject), ("body", body)] {
            session
                .apply(Command::SetField {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .unwrap();
        }
        session.apply(Command::SubmitModal).unwrap();
    }

    match session.configs().entry(&email) {
        Some(ConfigEntry::Email(config)) => {
            assert_eq!(config.subject, "Second");
            assert_eq!(config.body, "");
        }
        other => panic!("Expected email config, got {:?}", other),
    }
}

#[test]
fn test_cancel_does_not_touch_store() {
    let mut session = EditorSession::new();
    let hook = insert(&mut session, StepType::Webhook);
    session.apply(Command::OpenModal(hook.clone())).unwrap();
    session
        .apply(Command::SetField {
            name: "url".to_string(),
            value: "https://example.com".to_string(),
        })
        .unwrap();
    session.apply(Command::CancelModal).unwrap();

    assert!(!session.configs().contains(&hook));
    assert!(!session.modal().is_open());
}

#[test]
fn test_payload_order_mirrors_canvas() {
    let mut session = EditorSession::new();
    let a = insert(&mut session, StepType::Condition);
    let b = insert(&mut session, StepType::Approval);
    let c = insert(&mut session, StepType::Condition);
    session
        .apply(Command::Reorder(vec![c.clone(), a.clone(), b.clone()]))
        .unwrap();

    let payload = session.save_payload();
    let ids: Vec<&StepId> = payload.steps.iter().map(|s| &s.id).collect();
    assert_eq!(ids, vec![&c, &a, &b]);
    let orders: Vec<usize> = payload.steps.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(payload.steps[0].name, "Condition Step 1");
}

/// Always answers `{"success": false}`
struct RejectingBackend;

#[async_trait]
impl WorkflowBackend for RejectingBackend {
    fn endpoint(&self) -> &str {
        "memory://rejecting"
    }

    async fn save(&self, _payload: &SavePayload) -> Result<(), SaveError> {
        Err(SaveError::Rejected {
            url: self.endpoint().to_string(),
            status: 200,
            message: None,
        })
    }

    async fn fetch(&self) -> Result<WorkflowSnapshot, SaveError> {
        Ok(WorkflowSnapshot::default())
    }
}

#[tokio::test]
async fn test_rejected_save_leaves_session_unchanged() {
    let mut session = EditorSession::new();
    let timer = insert(&mut session, StepType::Timer);
    session.apply(Command::OpenModal(timer)).unwrap();
    session
        .apply(Command::SetField {
            name: "delay".to_string(),
            value: "5".to_string(),
        })
        .unwrap();
    session.apply(Command::SubmitModal).unwrap();
    let before = session.save_payload();

    let err = RejectingBackend.save(&before).await.unwrap_err();
    assert!(err.is_rejected());
    assert_eq!(session.save_payload(), before);
}
