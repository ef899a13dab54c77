use crate::document::{Document, DocumentMetadata, Pool};
use crate::store::ContextStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Document record as stored in a pool seed file
#[derive(Debug, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    id: Option<String>,
    content: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// In-process context store ranking documents by query-term overlap
///
/// Each pool is an independent list. Documents sharing no term with the query are
/// never returned; ties keep insertion order.
pub struct InMemoryContextStore {
    pools: Arc<RwLock<HashMap<Pool, Vec<Document>>>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            pools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append documents to a pool, overriding their pool tag
    pub async fn add_documents(&self, pool: Pool, documents: Vec<Document>) {
        let mut pools = self.pools.write().await;
        let entry = pools.entry(pool).or_default();
        entry.extend(documents.into_iter().map(|mut d| {
            d.metadata.pool = pool;
            d
        }));
    }

    /// Load a JSON array of documents into a pool, returning how many were added
    pub async fn load_json_file(&self, pool: Pool, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read document file {}", path.display()))?;

        let records: Vec<DocumentRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid document file {}", path.display()))?;

        let default_source = path.display().to_string();
        let documents: Vec<Document> = records
            .into_iter()
            .map(|r| Document {
                id: r.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                content: r.content,
                metadata: DocumentMetadata {
                    pool,
                    source: r.source.unwrap_or_else(|| default_source.clone()),
                    title: r.title,
                    url: r.url,
                },
            })
            .collect();

        let count = documents.len();
        self.add_documents(pool, documents).await;
        tracing::info!(pool = %pool, count, path = %path.display(), "loaded documents");
        Ok(count)
    }

    pub async fn len(&self, pool: Pool) -> usize {
        self.pools.read().await.get(&pool).map_or(0, Vec::len)
    }

    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.values().all(Vec::is_empty)
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn overlap(query_terms: &HashSet<String>, content: &str) -> usize {
    terms(content).intersection(query_terms).count()
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn search(&self, query: &str, pool: Pool, k: usize) -> Result<Vec<Document>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_terms = terms(query);
        let pools = self.pools.read().await;
        let Some(documents) = pools.get(&pool) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(usize, &Document)> = documents
            .iter()
            .map(|d| (overlap(&query_terms, &d.content), d))
            .filter(|(score, _)| *score > 0)
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<Document> = scored.into_iter().take(k).map(|(_, d)| d.clone()).collect();
        tracing::debug!(pool = %pool, k, hits = results.len(), "in-memory search");
        Ok(results)
    }
}
