use async_trait::async_trait;

use crate::error::Result;
use crate::models::ConversationThread;

/// Trait for checkpoint persistence backends
///
/// `save` is a compare-and-swap on `version`: the thread passed in carries the
/// version it was loaded at, and the write only succeeds if the stored copy still
/// has that version (0 meaning "not stored yet"). On success the stored thread is
/// returned with `version + 1` and a fresh `updated_at`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load a thread, `None` if it was never saved
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationThread>>;

    /// Persist a thread
    async fn save(&self, thread: ConversationThread) -> Result<ConversationThread>;
}

/// Check the expected version and stamp the next one
pub(crate) fn next_version(
    stored: Option<&ConversationThread>,
    mut thread: ConversationThread,
) -> Result<ConversationThread> {
    let found = stored.map_or(0, |t| t.version);
    if found != thread.version {
        return Err(crate::PersistError::VersionConflict {
            thread_id: thread.thread_id,
            expected: thread.version,
            found,
        });
    }

    thread.version += 1;
    thread.updated_at = chrono::Utc::now();
    Ok(thread)
}
