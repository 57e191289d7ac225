use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use talent_intake::crm::{CrmError, CrmReceipt, CrmTransport, SubmissionPayload};
use talent_intake::forms::FormKind;
use talent_intake::session::{SessionId, SessionStore, SharedSession, StoreError};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open sessions not touched for this long are dropped.
pub(crate) const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct StoredSession {
    session: SharedSession,
    touched: Instant,
}

#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    idle_ttl: Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl InMemorySessionStore {
    pub(crate) fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub(crate) fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub(crate) fn len(&self) -> usize {
        self.guard().map(|guard| guard.len()).unwrap_or_default()
    }

    /// Drop every session idle for at least the configured TTL.
    pub(crate) fn prune_idle(&self) -> Result<usize, StoreError> {
        let mut guard = self.guard()?;
        let pruned = prune(&mut guard, self.idle_ttl);
        if pruned > 0 {
            debug!(pruned, remaining = guard.len(), "idle intake sessions pruned");
        }
        Ok(pruned)
    }

    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, StoredSession>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session registry mutex poisoned".to_string()))
    }
}

fn prune(sessions: &mut HashMap<SessionId, StoredSession>, idle_ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, stored| stored.touched.elapsed() < idle_ttl);
    before - sessions.len()
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        prune(&mut guard, self.idle_ttl);
        if guard.contains_key(&id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(
            id,
            StoredSession {
                session,
                touched: Instant::now(),
            },
        );
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, StoreError> {
        let mut guard = self.guard()?;
        let Some(stored) = guard.get_mut(id) else {
            return Ok(None);
        };
        if stored.touched.elapsed() < self.idle_ttl {
            stored.touched = Instant::now();
            return Ok(Some(Arc::clone(&stored.session)));
        }
        guard.remove(id);
        debug!(session = %id, "expired intake session dropped on access");
        Ok(None)
    }

    fn remove(&self, id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.guard()?.remove(id).is_some())
    }
}

/// Accepts every submission and logs it instead of contacting the CRM.
#[derive(Default, Clone)]
pub(crate) struct DryRunTransport {
    delivered: Arc<Mutex<Vec<(FormKind, SubmissionPayload)>>>,
}

impl DryRunTransport {
    pub(crate) fn delivered(&self) -> Vec<(FormKind, SubmissionPayload)> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CrmTransport for DryRunTransport {
    async fn deliver(
        &self,
        form: FormKind,
        payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError> {
        info!(
            form = form.slug(),
            fields = payload.fields.len(),
            page = %payload.context.page_uri,
            "dry run: submission not sent to crm"
        );
        self.delivered
            .lock()
            .map_err(|_| CrmError::Transport("dry-run recorder mutex poisoned".to_string()))?
            .push((form, payload.clone()));
        Ok(CrmReceipt {
            status: 200,
            inline_message: Some("Dry run: nothing was sent.".to_string()),
        })
    }
}
