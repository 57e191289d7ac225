use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::store::{SessionId, SessionStore, SharedSession, StoreError};
use crate::config::IntakeConfig;
use crate::crm::CrmTransport;
use crate::forms::{
    FieldValue, FormCatalog, FormError, FormKind, FormSnapshot, IntakeSession, PrefillSource,
    SessionOptions, SubmissionState,
};

/// Session state as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub snapshot: FormSnapshot,
}

/// Service opening form sessions and routing applicant actions to their controllers.
pub struct IntakeService<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    catalog: Arc<FormCatalog>,
    config: IntakeConfig,
}

impl<S, T> IntakeService<S, T>
where
    S: SessionStore + 'static,
    T: CrmTransport + 'static,
{
    pub fn new(
        store: Arc<S>,
        transport: Arc<T>,
        catalog: Arc<FormCatalog>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            store,
            transport,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &FormCatalog {
        &self.catalog
    }

    /// Start a new session, seeding it from assessment parameters when present.
    pub fn open(
        &self,
        form: FormKind,
        prefill: PrefillSource,
    ) -> Result<SessionView, IntakeServiceError> {
        let options = SessionOptions::new(self.config.page_uri(form))
            .with_failure_policy(self.config.failure_policy);
        let session = self.catalog.open(form, Some(prefill), options);
        let snapshot = session.snapshot();

        let id = SessionId::generate();
        self.store
            .insert(id, Arc::new(Mutex::new(session)))?;

        info!(
            session = %id,
            form = form.slug(),
            from_assessment = snapshot.from_assessment,
            "intake session opened"
        );

        Ok(SessionView {
            session_id: id,
            snapshot,
        })
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |_| Ok(()))
    }

    pub fn set_field(
        &self,
        id: &SessionId,
        field: &str,
        value: FieldValue,
    ) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |session| session.set_field(field, value))
    }

    pub fn toggle(
        &self,
        id: &SessionId,
        field: &str,
        option: &str,
    ) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |session| session.toggle(field, option))
    }

    pub fn advance(&self, id: &SessionId) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |session| session.advance().map(|_| ()))
    }

    pub fn retreat(&self, id: &SessionId) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |session| session.retreat().map(|_| ()))
    }

    pub fn revisit(&self, id: &SessionId, step: usize) -> Result<SessionView, IntakeServiceError> {
        self.apply(id, |session| session.revisit(step).map(|_| ()))
    }

    /// Deliver the application. A call made while a delivery is outstanding returns the
    /// in-flight view without issuing another request.
    ///
    /// Delivery runs on its own task, so the outcome is recorded even when the caller stops
    /// waiting. A session that ends `Succeeded` is removed from the store.
    pub async fn submit(&self, id: &SessionId) -> Result<SessionView, IntakeServiceError> {
        let (handle, ticket) = {
            let shared = self.session(id)?;
            let ticket = {
                let mut session = lock(id, &shared)?;
                match session.begin_submission()? {
                    Some(ticket) => ticket,
                    None => return Ok(view_of(id, &session)),
                }
            };
            (Arc::downgrade(&shared), ticket)
        };

        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let id = *id;
        let delivery = tokio::spawn(async move {
            let result = transport.deliver(ticket.form(), ticket.payload()).await;

            let Some(shared) = handle.upgrade() else {
                warn!(
                    session = %id,
                    form = ticket.form().slug(),
                    delivered = result.is_ok(),
                    "session discarded while its submission was in flight"
                );
                return Err(IntakeServiceError::Disposed(id));
            };

            let view = {
                let mut session = lock(&id, &shared)?;
                session.complete_submission(ticket, result);
                view_of(&id, &session)
            };
            if view.snapshot.submission == SubmissionState::Succeeded {
                store.remove(&id)?;
                debug!(session = %id, "closed intake session released");
            }
            Ok(view)
        });

        delivery
            .await
            .map_err(|err| IntakeServiceError::Delivery(id, err.to_string()))?
    }

    pub fn discard(&self, id: &SessionId) -> Result<(), IntakeServiceError> {
        if !self.store.remove(id)? {
            return Err(IntakeServiceError::NotFound(*id));
        }
        info!(session = %id, "intake session discarded");
        Ok(())
    }

    fn session(&self, id: &SessionId) -> Result<SharedSession, IntakeServiceError> {
        self.store
            .fetch(id)?
            .ok_or(IntakeServiceError::NotFound(*id))
    }

    fn apply<F>(&self, id: &SessionId, operation: F) -> Result<SessionView, IntakeServiceError>
    where
        F: FnOnce(&mut IntakeSession) -> Result<(), FormError>,
    {
        let shared = self.session(id)?;
        let mut session = lock(id, &shared)?;
        operation(&mut session)?;
        Ok(view_of(id, &session))
    }
}

fn lock<'a>(
    id: &SessionId,
    shared: &'a SharedSession,
) -> Result<MutexGuard<'a, IntakeSession>, IntakeServiceError> {
    shared
        .lock()
        .map_err(|_| IntakeServiceError::Poisoned(*id))
}

fn view_of(id: &SessionId, session: &IntakeSession) -> SessionView {
    SessionView {
        session_id: *id,
        snapshot: session.snapshot(),
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session {0} was discarded before its submission completed")]
    Disposed(SessionId),
    #[error("submission task for session {0} did not finish: {1}")]
    Delivery(SessionId, String),
    #[error("session {0} is unusable after a panic")]
    Poisoned(SessionId),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
