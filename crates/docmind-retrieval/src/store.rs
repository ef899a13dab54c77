use crate::document::{Document, Pool};
use anyhow::Result;
use async_trait::async_trait;

/// Top-k semantic search over named document pools
///
/// Implementations rank documents by relevance to `query` and return at most `k`
/// of them, best first. An empty result is a valid answer; errors are reserved
/// for an unreachable or broken backend.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn search(&self, query: &str, pool: Pool, k: usize) -> Result<Vec<Document>>;
}
