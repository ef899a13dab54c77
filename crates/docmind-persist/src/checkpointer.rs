use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::error::{PersistError, Result};
use crate::models::ConversationThread;
use crate::store::CheckpointStore;

type ThreadLock = Arc<tokio::sync::Mutex<()>>;

/// Per-thread serialization over a [`CheckpointStore`]
///
/// A turn calls [`Checkpointer::begin`], which waits for the thread's lock and
/// loads its state. The lock is held by the returned [`CheckpointLease`] until it
/// is committed or dropped. Dropping without committing persists nothing.
pub struct Checkpointer {
    store: Arc<dyn CheckpointStore>,
    locks: Mutex<HashMap<String, ThreadLock>>,
}

impl Checkpointer {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    fn lock_for(&self, thread_id: &str) -> ThreadLock {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());

        // Drop locks nobody is holding or waiting on
        locks.retain(|id, lock| id == thread_id || Arc::strong_count(lock) > 1);

        locks
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Acquire the thread's lock and load (or create) its state
    pub async fn begin(&self, thread_id: &str) -> Result<CheckpointLease> {
        let guard = self.lock_for(thread_id).lock_owned().await;

        let thread = match self.store.load(thread_id).await? {
            Some(thread) => thread,
            None => {
                tracing::debug!(thread_id, "starting new thread");
                ConversationThread::new(thread_id)
            }
        };

        Ok(CheckpointLease {
            _guard: guard,
            store: Arc::clone(&self.store),
            thread,
        })
    }

    /// Load a persisted thread without taking its lock
    pub async fn snapshot(&self, thread_id: &str) -> Result<ConversationThread> {
        self.store
            .load(thread_id)
            .await?
            .ok_or_else(|| PersistError::NotFound(thread_id.to_string()))
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Exclusive access to one thread for the duration of a turn
pub struct CheckpointLease {
    _guard: OwnedMutexGuard<()>,
    store: Arc<dyn CheckpointStore>,
    thread: ConversationThread,
}

impl CheckpointLease {
    /// State as loaded at the start of the turn
    pub fn thread(&self) -> &ConversationThread {
        &self.thread
    }

    /// Persist the turn's result and release the lock
    ///
    /// `thread` must be derived from [`CheckpointLease::thread`]; its id and version
    /// are checked against the loaded state.
    pub async fn commit(self, mut thread: ConversationThread) -> Result<ConversationThread> {
        if thread.thread_id != self.thread.thread_id {
            return Err(PersistError::Corrupted {
                thread_id: self.thread.thread_id.clone(),
                reason: format!("commit carries thread {}", thread.thread_id),
            });
        }

        thread.version = self.thread.version;
        let saved = self.store.save(thread).await?;
        tracing::debug!(thread_id = %saved.thread_id, version = saved.version, "checkpoint committed");
        Ok(saved)
    }
}
