use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::ConversationThread;
use crate::store::{next_version, CheckpointStore};

/// Process-local checkpoint store
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    threads: RwLock<HashMap<String, ConversationThread>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationThread>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, thread: ConversationThread) -> Result<ConversationThread> {
        let mut threads = self.threads.write().await;
        let saved = next_version(threads.get(&thread.thread_id), thread)?;
        threads.insert(saved.thread_id.clone(), saved.clone());
        Ok(saved)
    }
}
