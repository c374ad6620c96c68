//! Session shared between threads

use super::session::{Session, SessionState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A session guarded by one lock
///
/// The provider is not reentrant, so every call on a shared session is
/// serialized through the mutex.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    /// Wraps a session for use from several threads
    pub fn new(session: Session) -> Self {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `f` with exclusive access to the session
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    /// Closes the underlying session for every holder
    pub fn close(&self) {
        self.lock().close();
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panic mid-call cannot leave the session half-released
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        SharedSession::new(session)
    }
}
