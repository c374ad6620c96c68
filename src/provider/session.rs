//! Provider session: owns the loaded library and its bound entry points

use super::ffi;
use super::loader::{ProviderLoader, ProviderModule, SystemLoader};
use super::symbols::{self, EntryPoint, EntryPointTable};
use crate::config::ProviderConfig;
use crate::core::types::{ModuleDescriptor, ProcessId, ProviderError, ProviderResult};
use crate::memory::{ScatterBatch, ScatterReader, ScatterReport};
use crate::process::ProcessResolver;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle of a session
///
/// `Unopened -> Opening -> Ready -> Closed`, or `Opening -> Failed` when
/// initialization is rejected. A ready session also moves to `Failed` when a
/// provider call fails at the communication level. `Failed` and `Closed` are
/// terminal and the library is already released in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    Ready,
    Failed,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unopened => "unopened",
            SessionState::Opening => "opening",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// An initialized provider
///
/// The library is released exactly once: by `close`, by a fail-stop, or
/// when the session is dropped, whichever happens first.
pub struct Session {
    module: Option<Box<dyn ProviderModule>>,
    entry_points: EntryPointTable,
    state: SessionState,
    library_path: PathBuf,
    args: Vec<String>,
}

impl Session {
    /// Loads and initializes the provider named in `config`
    pub fn open(config: &ProviderConfig) -> ProviderResult<Self> {
        Self::open_with(&SystemLoader, config)
    }

    /// Loads and initializes a provider through a specific loader
    pub fn open_with<L>(loader: &L, config: &ProviderConfig) -> ProviderResult<Self>
    where
        L: ProviderLoader + ?Sized,
    {
        Self::open_with_args(loader, Path::new(&config.library_path), config.to_args())
    }

    /// Loads and initializes a provider with an explicit argument vector
    pub fn open_with_args<L>(loader: &L, path: &Path, args: Vec<String>) -> ProviderResult<Self>
    where
        L: ProviderLoader + ?Sized,
    {
        debug!(
            "Session {} -> {}: loading {}",
            SessionState::Unopened,
            SessionState::Opening,
            path.display()
        );

        // On any early return below the module is dropped, which releases it
        let module = loader.load(path)?;
        let entry_points = symbols::bind(module.as_ref())?;

        let mut session = Session {
            module: Some(module),
            entry_points,
            state: SessionState::Opening,
            library_path: path.to_path_buf(),
            args,
        };

        if let Some(module) = &session.module {
            module.enter();
        }
        match ffi::initialize(&session.entry_points, &session.args) {
            Ok(true) => {
                session.state = SessionState::Ready;
                info!(
                    "Provider {} initialized with {:?}",
                    path.display(),
                    session.args
                );
                Ok(session)
            }
            Ok(false) => {
                warn!("Provider rejected initialization arguments {:?}", session.args);
                session.release(SessionState::Failed);
                Err(ProviderError::InitializationFailed {
                    args: std::mem::take(&mut session.args),
                })
            }
            Err(e) => {
                session.release(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether provider calls are accepted
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready && self.module.is_some()
    }

    /// Path the provider was loaded from
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    /// Arguments the provider was initialized with
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Looks up a process id by name; `None` if no process matches
    pub fn resolve_process(&mut self, name: &str) -> ProviderResult<Option<ProcessId>> {
        ProcessResolver::new(self).resolve_process(name)
    }

    /// Looks up a module of `pid` by name; `None` if it is not loaded
    pub fn resolve_module(
        &mut self,
        pid: ProcessId,
        name: &str,
    ) -> ProviderResult<Option<ModuleDescriptor>> {
        ProcessResolver::new(self).resolve_module(pid, name)
    }

    /// Reads every request of `batch` in one provider call
    pub fn read_scatter(
        &mut self,
        pid: ProcessId,
        batch: ScatterBatch,
    ) -> ProviderResult<ScatterReport> {
        ScatterReader::new(self).read(pid, batch)
    }

    /// Releases the provider; calling it again is a no-op
    pub fn close(&mut self) {
        match self.state {
            SessionState::Closed | SessionState::Failed => {}
            _ => {
                self.release(SessionState::Closed);
                info!("Session for {} closed", self.library_path.display());
            }
        }
    }

    /// Runs one provider call under the session's fail-stop rule
    ///
    /// Rejected without touching the provider unless the session is ready.
    /// A communication failure releases the library and leaves the session
    /// `Failed` before the error is returned.
    pub(crate) fn call<T, F>(&mut self, operation: EntryPoint, f: F) -> ProviderResult<T>
    where
        F: FnOnce(&EntryPointTable) -> ProviderResult<T>,
    {
        if !self.is_ready() {
            debug!("Rejected {} on {} session", operation, self.state);
            return Err(ProviderError::not_ready(self.state));
        }

        if let Some(module) = &self.module {
            module.enter();
        }
        match f(&self.entry_points) {
            Err(e @ ProviderError::CommunicationFailure { .. }) => {
                warn!("{} failed, aborting session: {}", operation, e);
                self.release(SessionState::Failed);
                Err(e)
            }
            other => other,
        }
    }

    fn release(&mut self, state: SessionState) {
        if let Some(module) = self.module.take() {
            drop(module);
            debug!("Released provider {}", self.library_path.display());
        }
        self.state = state;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("library_path", &self.library_path)
            .field("state", &self.state)
            .field("args", &self.args)
            .finish()
    }
}
