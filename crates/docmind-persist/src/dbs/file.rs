use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{PersistError, Result};
use crate::models::ConversationThread;
use crate::store::{next_version, CheckpointStore};

/// Checkpoint store keeping one JSON document per thread in a directory
///
/// Writes go to a temporary sibling file that is then renamed over the target, so
/// a reader never observes a half-written checkpoint.
pub struct FileCheckpointStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a thread's checkpoint file. Ids are escaped so any string is safe.
    pub fn thread_path(&self, thread_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_thread_id(thread_id)))
    }

    async fn read_thread(&self, thread_id: &str) -> Result<Option<ConversationThread>> {
        let path = self.thread_path(thread_id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistError::Unavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let thread: ConversationThread =
            serde_json::from_slice(&raw).map_err(|e| PersistError::Corrupted {
                thread_id: thread_id.to_string(),
                reason: e.to_string(),
            })?;

        if thread.thread_id != thread_id {
            return Err(PersistError::Corrupted {
                thread_id: thread_id.to_string(),
                reason: format!("file holds thread {}", thread.thread_id),
            });
        }

        Ok(Some(thread))
    }
}

fn escape_thread_id(thread_id: &str) -> String {
    let mut out = String::with_capacity(thread_id.len());
    for byte in thread_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationThread>> {
        self.read_thread(thread_id).await
    }

    async fn save(&self, thread: ConversationThread) -> Result<ConversationThread> {
        let _guard = self.write_lock.lock().await;

        let stored = self.read_thread(&thread.thread_id).await?;
        let saved = next_version(stored.as_ref(), thread)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistError::Unavailable(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.thread_path(&saved.thread_id);
        let tmp = path.with_extension(format!("json.tmp-{}", uuid::Uuid::new_v4()));
        let body = serde_json::to_vec_pretty(&saved)?;

        tokio::fs::write(&tmp, body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(thread_id = %saved.thread_id, version = saved.version, path = %path.display(), "checkpoint written");
        Ok(saved)
    }
}
