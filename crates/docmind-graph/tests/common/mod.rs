#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use docmind_graph::{Graph, GraphConfig};
use docmind_llm::{ChatClient, ChatRequest, ChatResponse, EventStream, StreamEvent};
use docmind_persist::{
    CheckpointStore, ConversationThread, InMemoryCheckpointStore, PersistError, ThreadMessage, ThreadSummary,
};
use docmind_retrieval::{ContextStore, Document, InMemoryContextStore, Pool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which prompt a request carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Rewrite,
    Answer,
    Summarize,
}

pub fn classify(request: &ChatRequest) -> CallKind {
    let last = request.messages.last().map(|m| m.content()).unwrap_or_default();
    if last == "Summarize the conversation." {
        CallKind::Summarize
    } else if last.contains("<question>") {
        CallKind::Rewrite
    } else {
        CallKind::Answer
    }
}

/// Generator fake answering by prompt kind
pub struct ScriptedClient {
    pub rewrite_reply: String,
    pub answer_tokens: Vec<String>,
    pub summary_reply: String,
    pub fail_answer: bool,
    pub answer_delay: Duration,
    pub token_delay: Duration,
    pub requests: Mutex<Vec<(CallKind, ChatRequest)>>,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self {
            rewrite_reply: r#"{"language": "es", "question": "What is a Random Forest Classifier?"}"#.to_string(),
            answer_tokens: vec!["A ".to_string(), "random ".to_string(), "forest.".to_string()],
            summary_reply: "User asked about random forests.".to_string(),
            fail_answer: false,
            answer_delay: Duration::ZERO,
            token_delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedClient {
    pub fn answer(&self) -> String {
        self.answer_tokens.concat()
    }

    pub fn calls(&self, kind: CallKind) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn record(&self, request: &ChatRequest) -> CallKind {
        let kind = classify(request);
        self.requests.lock().unwrap().push((kind, request.clone()));
        kind
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self.record(&request) {
            CallKind::Rewrite => Ok(ChatResponse::text(self.rewrite_reply.clone())),
            CallKind::Summarize => Ok(ChatResponse::text(self.summary_reply.clone())),
            CallKind::Answer => {
                tokio::time::sleep(self.answer_delay).await;
                if self.fail_answer {
                    anyhow::bail!("OpenAI API error (503): upstream unavailable");
                }
                Ok(ChatResponse::text(self.answer()))
            }
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        self.record(&request);
        if self.fail_answer {
            anyhow::bail!("OpenAI API error (503): upstream unavailable");
        }

        let tokens = self.answer_tokens.clone();
        let delay = self.token_delay;
        Ok(Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Message { content: String::new() });
            for token in tokens {
                tokio::time::sleep(delay).await;
                yield Ok(StreamEvent::Message { content: token });
            }
            yield Ok(StreamEvent::Done { finish_reason: Some("stop".to_string()) });
        }))
    }
}

/// Context store whose web pool is down
pub struct WebDownStore {
    pub inner: InMemoryContextStore,
}

#[async_trait]
impl ContextStore for WebDownStore {
    async fn search(&self, query: &str, pool: Pool, k: usize) -> Result<Vec<Document>> {
        if pool == Pool::Web {
            anyhow::bail!("web index unreachable");
        }
        self.inner.search(query, pool, k).await
    }
}

pub async fn seeded_store() -> InMemoryContextStore {
    let store = InMemoryContextStore::new();
    store
        .add_documents(
            Pool::Local,
            vec![
                Document::new(Pool::Local, "models.md", "A Random Forest Classifier is an ensemble of decision trees.")
                    .with_id("local-1"),
                Document::new(Pool::Local, "datasets.md", "Upload a dataset before training a classifier.")
                    .with_id("local-2"),
            ],
        )
        .await;
    store
        .add_documents(
            Pool::Web,
            vec![Document::new(Pool::Web, "https://laredo.example/models", "Laredo supports random forest models.")
                .with_id("web-1")],
        )
        .await;
    store
}

/// Checkpoint store that can be switched to fail loads or saves
#[derive(Default)]
pub struct FaultyCheckpointStore {
    pub inner: InMemoryCheckpointStore,
    pub fail_load: AtomicBool,
    pub fail_save: AtomicBool,
}

impl FaultyCheckpointStore {
    pub fn fail_loads(&self) {
        self.fail_load.store(true, Ordering::SeqCst);
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CheckpointStore for FaultyCheckpointStore {
    async fn load(&self, thread_id: &str) -> docmind_persist::Result<Option<ConversationThread>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("checkpoint backend offline".to_string()));
        }
        self.inner.load(thread_id).await
    }

    async fn save(&self, thread: ConversationThread) -> docmind_persist::Result<ConversationThread> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PersistError::VersionConflict {
                thread_id: thread.thread_id.clone(),
                expected: thread.version,
                found: thread.version + 1,
            });
        }
        self.inner.save(thread).await
    }
}

/// Graph over the seeded context store and the given checkpoint store
pub async fn graph_with_checkpoints(client: Arc<ScriptedClient>, checkpoints: Arc<dyn CheckpointStore>) -> Graph {
    Graph::builder()
        .client(client)
        .context_store(Arc::new(seeded_store().await))
        .checkpoint_store(checkpoints)
        .build()
        .unwrap()
}

pub struct Harness {
    pub graph: Graph,
    pub client: Arc<ScriptedClient>,
    pub checkpoints: Arc<InMemoryCheckpointStore>,
}

pub async fn harness(client: ScriptedClient) -> Harness {
    harness_with(client, Arc::new(seeded_store().await), GraphConfig::default()).await
}

pub async fn harness_with(
    client: ScriptedClient,
    store: Arc<dyn ContextStore>,
    config: GraphConfig,
) -> Harness {
    let client = Arc::new(client);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());

    let graph = Graph::builder()
        .client(client.clone())
        .context_store(store)
        .checkpoint_store(checkpoints.clone())
        .config(config)
        .build()
        .unwrap();

    Harness {
        graph,
        client,
        checkpoints,
    }
}

/// Persist a thread holding `count` alternating messages and an optional summary
pub async fn seed_thread(store: &InMemoryCheckpointStore, thread_id: &str, count: usize, summary: Option<&str>) {
    let mut thread = ConversationThread::new(thread_id);
    for i in 0..count {
        let message = if i % 2 == 0 {
            ThreadMessage::user(format!("question {i}"))
        } else {
            ThreadMessage::assistant(format!("answer {i}"))
        };
        thread.messages.push(message);
    }
    thread.summary = summary.map(|text| ThreadSummary {
        text: text.to_string(),
        generated_at: chrono::Utc::now(),
        messages_count: count,
    });
    store.save(thread).await.unwrap();
}
