use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::IntakeSession;

/// Handle shared between the registry and in-progress requests.
pub type SharedSession = Arc<Mutex<IntakeSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registry of open sessions keyed by id.
pub trait SessionStore: Send + Sync {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, StoreError>;
    /// Returns whether a session was removed.
    fn remove(&self, id: &SessionId) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
