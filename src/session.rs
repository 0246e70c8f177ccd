//! Authentication state shared by every backend call.
//!
//! A [`Session`] is created at start-up, changed only by sign-in and sign-out,
//! and handed to each component that talks to the backend. Components that
//! care about sign-in changes subscribe to it instead of polling the store.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::Result;

/// Persistence for the single bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the token for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Poisoned locks are recovered; the slot is never half-written.
    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Persists the token to a file so it survives restarts.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let token = text.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether a bearer token is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn,
}

/// Explicit session object: token storage plus an observable auth state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    state: Arc<watch::Sender<AuthState>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session over `store`, signed in if it already holds a token.
    pub fn new(store: impl TokenStore + 'static) -> Result<Self> {
        let initial = if store.load()?.is_some() {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        };
        debug!(?initial, "opened session");
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            store: Arc::new(store),
            state: Arc::new(tx),
        })
    }

    /// Session kept in memory, starting signed out.
    pub fn in_memory() -> Self {
        let (tx, _rx) = watch::channel(AuthState::SignedOut);
        Self {
            store: Arc::new(MemoryTokenStore::default()),
            state: Arc::new(tx),
        }
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.store.load()
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Receiver that observes every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn sign_in(&self, token: &str) -> Result<()> {
        self.store.save(token)?;
        self.state.send_replace(AuthState::SignedIn);
        info!("signed in");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.clear()?;
        self.state.send_replace(AuthState::SignedOut);
        info!("signed out");
        Ok(())
    }

    /// `Authorization` header value, if signed in.
    pub fn bearer(&self) -> Result<Option<String>> {
        Ok(self.token()?.map(|t| format!("Bearer {t}")))
    }
}
