use std::sync::Arc;
use anyhow::{anyhow, Result};

use docmind_llm::ChatClient;
use docmind_persist::{CheckpointStore, Checkpointer, InMemoryCheckpointStore};
use docmind_retrieval::ContextStore;

use crate::graph::{Graph, GraphContext};
use crate::router::{ConversationRouter, Router};
use crate::types::GraphConfig;

/// Builder for constructing a Graph with optional components
pub struct GraphBuilder {
    client: Option<Arc<dyn ChatClient>>,
    context_store: Option<Arc<dyn ContextStore>>,
    checkpointer: Option<Arc<Checkpointer>>,
    router: Option<Arc<dyn Router>>,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            context_store: None,
            checkpointer: None,
            router: None,
            config: GraphConfig::default(),
        }
    }

    /// Set the generator client
    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the context store queried for both pools
    pub fn context_store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.context_store = Some(store);
        self
    }

    /// Persist threads in `store` (in-memory when unset)
    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpointer = Some(Arc::new(Checkpointer::new(store)));
        self
    }

    /// Share an existing checkpointer, and its locks, with other graphs
    pub fn checkpointer(mut self, checkpointer: Arc<Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Override the summarization decision
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// Set the graph configuration
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the Graph
    pub fn build(self) -> Result<Graph> {
        let client = self.client.ok_or_else(|| anyhow!("Chat client is required"))?;
        let context_store = self
            .context_store
            .ok_or_else(|| anyhow!("Context store is required"))?;

        let checkpointer = self
            .checkpointer
            .unwrap_or_else(|| Arc::new(Checkpointer::new(Arc::new(InMemoryCheckpointStore::new()))));
        let router = self
            .router
            .unwrap_or_else(|| Arc::new(ConversationRouter::new(self.config.summarization_threshold)));

        Ok(Graph::from_context(GraphContext {
            client,
            context_store,
            checkpointer,
            router,
            config: Arc::new(self.config),
        }))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
