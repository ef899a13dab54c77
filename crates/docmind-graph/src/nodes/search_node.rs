use crate::node::{EventSender, Node};
use crate::types::{Stage, StreamEvent, TurnState};
use anyhow::Result;
use async_trait::async_trait;
use docmind_retrieval::{ContextStore, Document, Pool};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Queries the local and web pools concurrently
pub struct RetrievalNode {
    store: Arc<dyn ContextStore>,
    local_k: usize,
    web_k: usize,
    timeout: Duration,
}

struct PoolResult {
    documents: Vec<Document>,
    duration_ms: u64,
}

impl RetrievalNode {
    pub fn new(store: Arc<dyn ContextStore>, local_k: usize, web_k: usize, timeout: Duration) -> Self {
        Self {
            store,
            local_k,
            web_k,
            timeout,
        }
    }

    /// Search both pools and return `(local, web)` once both have settled
    ///
    /// A failed or timed out pool yields an empty list.
    pub async fn retrieve(&self, query: &str) -> (Vec<Document>, Vec<Document>) {
        let (local, web) = self.retrieve_timed(query).await;
        (local.documents, web.documents)
    }

    async fn retrieve_timed(&self, query: &str) -> (PoolResult, PoolResult) {
        tokio::join!(
            self.search_pool(query, Pool::Local, self.local_k),
            self.search_pool(query, Pool::Web, self.web_k),
        )
    }

    async fn search_pool(&self, query: &str, pool: Pool, k: usize) -> PoolResult {
        let start = Instant::now();

        let documents = match tokio::time::timeout(self.timeout, self.store.search(query, pool, k)).await {
            Ok(Ok(documents)) => documents,
            Ok(Err(e)) => {
                tracing::warn!(pool = %pool, error = %format!("{e:#}"), "context search failed, continuing without it");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(pool = %pool, timeout_ms = self.timeout.as_millis() as u64, "context search timed out, continuing without it");
                Vec::new()
            }
        };

        PoolResult {
            documents,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[async_trait]
impl Node for RetrievalNode {
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()> {
        for stage in [Stage::SearchLocal, Stage::SearchWeb] {
            event_tx.send(StreamEvent::NodeStarted { stage }).await?;
        }

        let (local, web) = self.retrieve_timed(state.effective_question()).await;

        for (stage, result) in [(Stage::SearchLocal, &local), (Stage::SearchWeb, &web)] {
            event_tx
                .send(StreamEvent::NodeCompleted {
                    stage,
                    duration_ms: result.duration_ms,
                })
                .await?;
        }

        tracing::debug!(
            run_id = %state.run_id,
            local = local.documents.len(),
            web = web.documents.len(),
            "context retrieved"
        );
        state.local_context = local.documents;
        state.web_context = web.documents;
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::Retrieve
    }
}
