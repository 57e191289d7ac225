//! HTTP-facing registry of form sessions.
//!
//! Each session wraps one controller behind a mutex. Submission releases the lock while the
//! CRM request is outstanding and re-acquires the session through a weak handle, so a session
//! discarded mid-request is never resurrected.

pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use router::intake_router;
pub use service::{IntakeService, IntakeServiceError, SessionView};
pub use store::{SessionId, SessionStore, SharedSession, StoreError};
