use crate::config::Config;
use docmind_graph::Graph;
use std::sync::Arc;

/// Shared application state passed to all handlers
///
/// The Graph is created once at startup; per-thread state lives in its
/// checkpointer, not here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph: Arc<Graph>,
}

impl AppState {
    pub fn new(config: Config, graph: Graph) -> Self {
        Self {
            config: Arc::new(config),
            graph: Arc::new(graph),
        }
    }

    pub fn default_thread_id(&self) -> &str {
        &self.config.chatbot.default_thread_id
    }
}
