//! Exclusive access to a versioned store.
//!
//! Each [`RepositoryAccessManager`] owns exactly one lock for its store. All
//! writers against the same store serialize on it, regardless of which part
//! of the tree they touch. Different stores have different managers and never
//! contend.
//!
//! The lock has two levels: an in-process mutex shared by clones of the
//! manager, and an exclusive `flock` on the store's
//! [`lock_file`](VersionedStore::lock_file) shared with every other process
//! (and every other manager) pointed at the same store.
//!
//! Shutdown uses [`RepositoryAccessManager::drain`] (or [`drain_all`]) to take
//! every lock and keep it: once drained, no new write can start, and the
//! returned [`DrainGuard`]s prove no write is in flight.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use futures::future::join_all;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::status::StoreStatus;
use crate::store::{RevisionId, VersionedStore};

/// How shutdown treats in-flight writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Wait for every store's lock and hold it.
    #[default]
    Graceful,
    /// Skip lock acquisition entirely; an in-flight write may be interrupted.
    Immediate,
}

/// An exclusive `flock` on a lock file, released on drop.
#[derive(Debug)]
struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    fn open(path: &Path) -> StoreResult<File> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| StoreError::Lock {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Block (on the blocking pool) until the lock is ours.
    async fn acquire(path: PathBuf) -> StoreResult<Self> {
        tokio::task::spawn_blocking(move || {
            let file = Self::open(&path)?;
            FileExt::lock_exclusive(&file).map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;
            Ok(Self { file, path })
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    fn try_acquire(path: PathBuf) -> StoreResult<Option<Self>> {
        let file = Self::open(&path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(source) => Err(StoreError::Lock { path, source }),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to unlock store lock file");
        }
    }
}

/// Both lock levels. The file lock is released before the mutex.
#[derive(Debug)]
struct StoreGuard {
    _file: Option<FileLock>,
    _mutex: OwnedMutexGuard<()>,
}

/// Hands out [`AccessScope`]s for a single store, one at a time.
///
/// Cloning is cheap and clones share the same lock.
#[derive(Clone)]
pub struct RepositoryAccessManager {
    name: Arc<str>,
    store: Arc<dyn VersionedStore>,
    lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for RepositoryAccessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryAccessManager")
            .field("name", &self.name)
            .field("working_dir", &self.store.working_dir())
            .finish()
    }
}

impl RepositoryAccessManager {
    pub fn new(name: impl Into<String>, store: Arc<dyn VersionedStore>) -> Self {
        Self {
            name: Arc::from(name.into()),
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying store. Read-only queries (URLs) may go through it
    /// directly; mutations must go through a scope.
    pub fn store(&self) -> &Arc<dyn VersionedStore> {
        &self.store
    }

    async fn lock(&self) -> StoreResult<StoreGuard> {
        let mutex = Arc::clone(&self.lock).lock_owned().await;
        let file = match self.store.lock_file() {
            Some(path) => Some(FileLock::acquire(path).await?),
            None => None,
        };
        Ok(StoreGuard {
            _file: file,
            _mutex: mutex,
        })
    }

    fn try_lock(&self) -> StoreResult<Option<StoreGuard>> {
        let Ok(mutex) = Arc::clone(&self.lock).try_lock_owned() else {
            return Ok(None);
        };
        let file = match self.store.lock_file() {
            Some(path) => match FileLock::try_acquire(path)? {
                Some(file) => Some(file),
                None => return Ok(None),
            },
            None => None,
        };
        Ok(Some(StoreGuard {
            _file: file,
            _mutex: mutex,
        }))
    }

    /// Wait for the lock and return a scope holding it.
    ///
    /// The lock is released when the scope is dropped.
    pub async fn access(&self) -> StoreResult<AccessScope> {
        let guard = self.lock().await?;
        debug!(store = %self.name, "access scope opened");
        Ok(self.scope(guard))
    }

    /// Acquire the lock only if it is free right now, in this process and
    /// every other.
    pub fn try_access(&self) -> StoreResult<Option<AccessScope>> {
        Ok(self.try_lock()?.map(|guard| self.scope(guard)))
    }

    /// Run `work` with a freshly acquired scope, releasing it afterward.
    ///
    /// The scope moves into `work`; it is dropped (and the lock released)
    /// when the returned future completes, unwinds, or is dropped.
    pub async fn access_with<T, F, Fut>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(AccessScope) -> Fut,
        Fut: Future<Output = T>,
    {
        let scope = self.access().await?;
        Ok(work(scope).await)
    }

    /// Take the lock and keep it for the lifetime of the returned guard.
    ///
    /// Every later [`access`](Self::access), here or in another process,
    /// waits until the guard is dropped.
    pub async fn drain(&self) -> StoreResult<DrainGuard> {
        let guard = self.lock().await?;
        info!(store = %self.name, "store drained, new writers will wait");
        Ok(DrainGuard {
            store: self.name.to_string(),
            _guard: guard,
        })
    }

    fn scope(&self, guard: StoreGuard) -> AccessScope {
        AccessScope {
            store_name: Arc::clone(&self.name),
            store: Arc::clone(&self.store),
            _guard: guard,
        }
    }
}

/// Drain every manager concurrently.
///
/// With [`ShutdownMode::Immediate`] nothing is acquired and the result is empty.
/// The first store that cannot be locked fails the whole drain; guards already
/// taken are released.
pub async fn drain_all(
    managers: &[RepositoryAccessManager],
    mode: ShutdownMode,
) -> StoreResult<Vec<DrainGuard>> {
    match mode {
        ShutdownMode::Immediate => {
            warn!(
                stores = managers.len(),
                "immediate shutdown requested, not waiting for in-flight writes"
            );
            Ok(Vec::new())
        }
        ShutdownMode::Graceful => join_all(managers.iter().map(|m| m.drain()))
            .await
            .into_iter()
            .collect(),
    }
}

/// Proof that a store's lock is held for shutdown.
#[derive(Debug)]
pub struct DrainGuard {
    store: String,
    _guard: StoreGuard,
}

impl DrainGuard {
    pub fn store(&self) -> &str {
        &self.store
    }
}

/// Lock-held handle on a store's working tree.
pub struct AccessScope {
    store_name: Arc<str>,
    store: Arc<dyn VersionedStore>,
    _guard: StoreGuard,
}

impl AccessScope {
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn working_dir(&self) -> &Path {
        self.store.working_dir()
    }

    pub async fn status(&self, path: &Path) -> StoreResult<StoreStatus> {
        self.store.status(path).await
    }

    pub async fn stage_all(&self, path: &Path) -> StoreResult<()> {
        self.store.stage_all(path).await
    }

    pub async fn commit_and_push(&self, message: &str) -> StoreResult<RevisionId> {
        self.store.commit_and_push(message).await
    }

    pub async fn reset_and_clean(&self, path: &Path) -> StoreResult<()> {
        self.store.reset_and_clean(path).await
    }

    pub async fn current_revision(&self) -> StoreResult<RevisionId> {
        self.store.current_revision().await
    }

    pub async fn origin_url(&self) -> StoreResult<String> {
        self.store.origin_url().await
    }

    pub async fn raw_file_base_url(&self) -> StoreResult<String> {
        self.store.raw_file_base_url().await
    }
}

impl Drop for AccessScope {
    fn drop(&mut self) {
        debug!(store = %self.store_name, "access scope released");
    }
}
