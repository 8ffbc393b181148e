use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use editor_core::errors::PieceTableError;

use crate::ClientId;
use crate::document::{DocumentHandle, Snapshot};
use crate::errors::{SessionError, SessionResult};
use crate::event::EditorEvent;

/// Commands a document actor may have queued before senders block.
pub const DEFAULT_QUEUE_BOUND: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub queue_bound: usize,
    /// Passed to every piece table the manager loads.
    pub buffer: editor_core::config::Config,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_bound: DEFAULT_QUEUE_BOUND,
            buffer: editor_core::config::Config::default(),
        }
    }
}

/// One client's connection to a shared document.
#[derive(Debug)]
pub struct Subscription {
    pub client_id: ClientId,
    pub document: DocumentHandle,
    /// A snapshot arrives after every event applied to the document.
    pub updates: crossbeam_channel::Receiver<Snapshot>,
}

impl Subscription {
    /// # Errors
    ///
    /// Returns [`SessionError::Disconnected`] if the document actor has exited.
    pub fn send(&self, event: impl Into<EditorEvent>) -> SessionResult<()> {
        self.document.send(self.client_id, event.into())
    }
}

/// A registered document and how many subscriptions point at it.
#[derive(Debug)]
struct OpenDocument {
    handle: DocumentHandle,
    clients: usize,
}

/// Registry of open documents, keyed by canonical path. Construct one per
/// process.
///
/// The registry lock only guards bookkeeping: loading a file and waiting on a
/// document actor happen outside it.
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    documents: std::sync::Mutex<HashMap<std::path::PathBuf, OpenDocument>>,
    next_client: AtomicU64,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Registry key for `path`. Spellings of the same file (`a.txt`, `./a.txt`,
/// a symlink) share one key.
fn document_key(path: &std::path::Path) -> std::io::Result<std::path::PathBuf> {
    std::fs::canonicalize(path)
}

impl SessionManager {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            documents: std::sync::Mutex::new(HashMap::new()),
            next_client: AtomicU64::new(1),
        }
    }

    fn documents(
        &self,
    ) -> SessionResult<std::sync::MutexGuard<'_, HashMap<std::path::PathBuf, OpenDocument>>> {
        self.documents.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Counts one more client on an already open document.
    fn claim(&self, key: &std::path::Path) -> SessionResult<Option<DocumentHandle>> {
        Ok(self.documents()?.get_mut(key).map(|open| {
            open.clients += 1;
            open.handle.clone()
        }))
    }

    /// Counts one client off `document`, forgetting it when nobody is left.
    fn release(&self, document: &DocumentHandle) -> SessionResult<()> {
        let mut documents = self.documents()?;
        let Some(open) = documents.get_mut(document.path()) else {
            return Ok(());
        };

        if !open.handle.same_document(document) {
            return Ok(());
        }

        open.clients = open.clients.saturating_sub(1);

        if open.clients == 0 {
            documents.remove(document.path());
            tracing::info!(path = %document.path().display(), "closing document session");
        }

        Ok(())
    }

    /// Drops `document` from the registry regardless of its client count.
    fn forget(&self, document: &DocumentHandle) -> SessionResult<()> {
        let mut documents = self.documents()?;

        if documents
            .get(document.path())
            .is_some_and(|open| open.handle.same_document(document))
        {
            documents.remove(document.path());
        }

        Ok(())
    }

    /// Joins the session for `path`, loading the file if nobody has it open.
    ///
    /// The new client starts at the origin in Normal mode and immediately
    /// receives a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Buffer`] if the file cannot be loaded, or
    /// [`SessionError::Spawn`] if the actor thread cannot start.
    pub fn subscribe(
        &self,
        path: impl AsRef<std::path::Path>,
        width: usize,
        height: usize,
    ) -> SessionResult<Subscription> {
        let key = document_key(path.as_ref())
            .map_err(|e| SessionError::Buffer(PieceTableError::from(e)))?;
        let client_id = self.next_client.fetch_add(1, Ordering::Relaxed);

        let document = match self.claim(&key)? {
            Some(document) => document,
            None => {
                let spawned =
                    DocumentHandle::spawn(&key, self.config.buffer, self.config.queue_bound)?;
                let mut documents = self.documents()?;
                // Another subscriber may have loaded it meanwhile; theirs wins
                // and `spawned` shuts down when dropped.
                let open = documents.entry(key).or_insert_with(|| OpenDocument {
                    handle: spawned,
                    clients: 0,
                });

                open.clients += 1;
                open.handle.clone()
            }
        };

        match document.join(client_id, width, height) {
            Ok(updates) => Ok(Subscription {
                client_id,
                document,
                updates,
            }),
            Err(SessionError::Disconnected) => {
                tracing::warn!(path = %document.path().display(), "document actor is gone");
                self.forget(&document)?;

                Err(SessionError::Disconnected)
            }
            Err(e) => {
                self.release(&document)?;

                Err(e)
            }
        }
    }

    /// Leaves the session. The last client out closes the document without
    /// saving.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Poisoned`] if the registry lock is poisoned.
    pub fn unsubscribe(&self, subscription: Subscription) -> SessionResult<()> {
        self.release(&subscription.document)?;

        match subscription.document.leave(subscription.client_id) {
            Ok(()) | Err(SessionError::Disconnected) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Saves the open document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDocument`] if no session has it open,
    /// or the save failure reported by the document actor.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> SessionResult<()> {
        let path = path.as_ref();
        let key = document_key(path).unwrap_or_else(|_| path.to_path_buf());
        let document = self
            .documents()?
            .get(&key)
            .map(|open| open.handle.clone())
            .ok_or_else(|| SessionError::UnknownDocument(path.to_path_buf()))?;

        document.save()
    }

    /// Number of documents with an open session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Poisoned`] if the registry lock is poisoned.
    pub fn open_documents(&self) -> SessionResult<usize> {
        Ok(self.documents()?.len())
    }
}
