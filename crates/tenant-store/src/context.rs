//! Store context
//!
//! The process-wide handle to the shared document store. It is opened once
//! at startup, cloned into every component constructor, and closed at
//! shutdown. After `close()` every operation fails with `StoreError::Closed`.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tenant_org::{Administrator, Organization, StoreError, StoreResult};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// URI scheme served by the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory://";

/// Connection settings for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection string
    pub uri: String,

    /// Master database holding the metadata collections and partitions
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "memory://localhost".to_string(),
            database: "master_db".to_string(),
        }
    }
}

/// Contents of the master database.
///
/// Each field stands for one collection; physical partitions are keyed by
/// their namespaced name.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) admins: HashMap<Uuid, Administrator>,
    pub(crate) organizations: HashMap<Uuid, Organization>,
    pub(crate) partitions: BTreeSet<String>,
}

struct ContextInner {
    config: StoreConfig,
    state: RwLock<StoreState>,
    open: AtomicBool,
}

/// Shared handle to the master database.
///
/// Cheap to clone. Every store operation takes the state lock exactly once,
/// which gives single-document atomicity and nothing more: sequences of
/// operations can interleave with other callers.
#[derive(Clone)]
pub struct StoreContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("database", &self.inner.config.database)
            .field("open", &self.is_open())
            .finish()
    }
}

impl StoreContext {
    /// Open a store context.
    ///
    /// Only `memory://` URIs are served by this backend.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        if !config.uri.starts_with(MEMORY_SCHEME) {
            return Err(StoreError::Unavailable(format!(
                "unsupported store uri: {}",
                config.uri
            )));
        }

        tracing::info!(database = %config.database, "Store context opened");

        Ok(Self {
            inner: Arc::new(ContextInner {
                config,
                state: RwLock::new(StoreState::default()),
                open: AtomicBool::new(true),
            }),
        })
    }

    /// Open an in-memory context with default settings.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config: StoreConfig::default(),
                state: RwLock::new(StoreState::default()),
                open: AtomicBool::new(true),
            }),
        }
    }

    /// Close the context. Idempotent.
    pub fn close(&self) {
        if self.inner.open.swap(false, Ordering::SeqCst) {
            tracing::info!(database = %self.inner.config.database, "Store context closed");
        }
    }

    /// Whether the context still accepts operations.
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Name of the master database.
    pub fn database(&self) -> &str {
        &self.inner.config.database
    }

    /// Names of all physical partitions, sorted.
    pub async fn partition_names(&self) -> StoreResult<Vec<String>> {
        let state = self.read().await?;
        Ok(state.partitions.iter().cloned().collect())
    }

    pub(crate) async fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.ensure_open()?;
        Ok(self.inner.state.read().await)
    }

    pub(crate) async fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.ensure_open()?;
        Ok(self.inner.state.write().await)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }
}
