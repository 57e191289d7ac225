use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::IntakeConfig;
use crate::crm::{CrmError, CrmReceipt, CrmTransport, SubmissionPayload};
use crate::forms::{FieldValue, FormCatalog, FormKind, PrefillSource};
use crate::session::{
    intake_router, IntakeService, SessionId, SessionStore, SessionView, SharedSession,
    StoreError,
};

#[derive(Default, Clone)]
pub(super) struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SharedSession>>>,
}

impl MemorySessionStore {
    pub(super) fn len(&self) -> usize {
        self.sessions.lock().expect("store mutex poisoned").len()
    }
}

impl SessionStore for MemorySessionStore {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        if guard.contains_key(&id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(id, session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, StoreError> {
        let guard = self.sessions.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        Ok(guard.remove(id).is_some())
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _id: SessionId, _session: SharedSession) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("registry offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SharedSession>, StoreError> {
        Err(StoreError::Unavailable("registry offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("registry offline".to_string()))
    }
}

/// Transport that answers every delivery with a fixed outcome.
pub(super) struct FixedTransport {
    outcome: Result<CrmReceipt, CrmError>,
    calls: AtomicUsize,
    last_payload: Mutex<Option<SubmissionPayload>>,
}

impl FixedTransport {
    pub(super) fn accepting() -> Self {
        Self::answering(Ok(CrmReceipt {
            status: 200,
            inline_message: Some("Thanks for applying!".to_string()),
        }))
    }

    pub(super) fn rejecting() -> Self {
        Self::answering(Err(CrmError::Rejected {
            status: 400,
            message: "Invalid email".to_string(),
            errors: Vec::new(),
        }))
    }

    fn answering(outcome: Result<CrmReceipt, CrmError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_payload(&self) -> Option<SubmissionPayload> {
        self.last_payload
            .lock()
            .expect("payload mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CrmTransport for FixedTransport {
    async fn deliver(
        &self,
        _form: FormKind,
        payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().expect("payload mutex poisoned") = Some(payload.clone());
        self.outcome.clone()
    }
}

/// Transport that parks every delivery until the test releases it.
#[derive(Default)]
pub(super) struct GatedTransport {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

impl GatedTransport {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) async fn wait_for_delivery(&self) {
        self.entered.notified().await;
    }

    pub(super) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl CrmTransport for GatedTransport {
    async fn deliver(
        &self,
        _form: FormKind,
        _payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(CrmReceipt {
            status: 200,
            inline_message: None,
        })
    }
}

pub(super) fn build_service<T: CrmTransport + 'static>(
    transport: Arc<T>,
) -> (IntakeService<MemorySessionStore, T>, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::default());
    let catalog = Arc::new(FormCatalog::standard().expect("catalog builds"));
    let config = IntakeConfig {
        public_url: "https://apply.example.com".to_string(),
        ..IntakeConfig::default()
    };
    let service = IntakeService::new(store.clone(), transport, catalog, config);
    (service, store)
}

pub(super) fn router_with<T: CrmTransport + 'static>(transport: Arc<T>) -> axum::Router {
    let (service, _) = build_service(transport);
    intake_router(Arc::new(service))
}

/// Opens a cohort session and walks it to the final step with complete answers.
pub(super) fn ready_cohort_session<T: CrmTransport + 'static>(
    service: &IntakeService<MemorySessionStore, T>,
) -> SessionId {
    let view = service
        .open(FormKind::Cohort, PrefillSource::default())
        .expect("session opens");
    let id = view.session_id;

    for (field, value) in [
        ("firstName", "Alex"),
        ("lastName", "Johnson"),
        ("email", "alex@uni.edu"),
    ] {
        service
            .set_field(&id, field, FieldValue::text(value))
            .expect("field accepted");
    }
    service.advance(&id).expect("identity complete");
    service
        .set_field(&id, "graduationYear", FieldValue::text("2026"))
        .expect("field accepted");
    service
        .set_field(&id, "whySales", FieldValue::text("non-empty"))
        .expect("field accepted");
    service.advance(&id).expect("background complete");
    let view: SessionView = service
        .set_field(&id, "heardFrom", FieldValue::text("LinkedIn"))
        .expect("field accepted");
    assert!(view.snapshot.step_valid);
    id
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
