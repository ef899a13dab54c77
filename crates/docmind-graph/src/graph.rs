use crate::builder::GraphBuilder;
use crate::node::{EventSender, Node};
use crate::nodes::{AnswerNode, InputNode, OutputNode, RetrievalNode, RewriteNode, SummarizeNode};
use crate::router::{Router, Transition};
use crate::streaming::demultiplex;
use crate::types::{DeliveryMode, GraphConfig, Stage, StreamEvent, TurnInput, TurnOutput, TurnState};
use anyhow::{anyhow, Context, Result};
use docmind_llm::ChatClient;
use docmind_persist::{CheckpointLease, Checkpointer};
use docmind_retrieval::ContextStore;
use futures::Stream;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// Collaborators shared by every turn
pub(crate) struct GraphContext {
    pub(crate) client: Arc<dyn ChatClient>,
    pub(crate) context_store: Arc<dyn ContextStore>,
    pub(crate) checkpointer: Arc<Checkpointer>,
    pub(crate) router: Arc<dyn Router>,
    pub(crate) config: Arc<GraphConfig>,
}

/// Conversation orchestrator
///
/// Runs the fixed stage sequence parse_input → rewrite_question → retrieve
/// (search_local ∥ search_web) → generate_answer → [summarize_conversation] →
/// parse_output for one thread at a time, persisting the thread before the
/// output is emitted.
pub struct Graph {
    inner: Arc<GraphContext>,
}

impl Graph {
    pub(crate) fn from_context(inner: GraphContext) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.inner.config
    }

    pub fn checkpointer(&self) -> &Arc<Checkpointer> {
        &self.inner.checkpointer
    }

    /// Spawn a turn in the background, return its event receiver
    ///
    /// The channel is bounded; a turn whose receiver is dropped fails on its next
    /// send and persists nothing.
    pub fn spawn_run(&self, input: TurnInput, delivery: DeliveryMode) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(self.inner.config.channel_capacity);
        let ctx = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let (progress, _) = watch::channel(None::<Stage>);
            let thread_id = input.thread_id.clone();

            let result = Self::execute_turn(&ctx, input, delivery, tx.clone(), &progress).await;

            if let Err(e) = result {
                let stage = *progress.borrow();
                let message = format!("{e:#}");

                if tx.is_closed() {
                    tracing::info!(thread_id = %thread_id, stage = ?stage, "Consumer disconnected, turn aborted");
                    return;
                }

                tracing::error!(thread_id = %thread_id, stage = ?stage, error = %message, "Turn failed");
                // A consumer that stopped reading must not pin the task
                if tx.try_send(StreamEvent::Error { message, stage }).is_err() {
                    tracing::warn!(thread_id = %thread_id, "Event channel full, error event dropped");
                }
            }
        });

        rx
    }

    /// Run a turn to completion and return its output
    pub async fn invoke(&self, input: TurnInput) -> Result<TurnOutput> {
        let mut rx = self.spawn_run(input, DeliveryMode::Buffered);
        let mut output = None;

        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Output { output: o } => output = Some(o),
                StreamEvent::Error { message, .. } => anyhow::bail!(message),
                StreamEvent::EndStream { .. } => break,
                _ => {}
            }
        }

        output.ok_or_else(|| anyhow!("Turn ended without producing an answer"))
    }

    /// Run a turn with token streaming, yielding framed answer chunks
    pub fn stream(&self, input: TurnInput) -> impl Stream<Item = String> + Send + 'static {
        demultiplex(self.spawn_run(input, DeliveryMode::Streamed))
    }

    async fn execute_turn(
        ctx: &GraphContext,
        input: TurnInput,
        delivery: DeliveryMode,
        event_tx: EventSender,
        progress: &watch::Sender<Option<Stage>>,
    ) -> Result<()> {
        let start_time = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        tracing::info!(run_id = %run_id, thread_id = %input.thread_id, delivery = ?delivery, "Turn started");

        event_tx
            .send(StreamEvent::InitStream {
                run_id: run_id.clone(),
                thread_id: input.thread_id.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            })
            .await?;

        // Held until commit; dropping it on any early return persists nothing.
        // Waiting for it does not count against the execution timeout.
        let lease = tokio::select! {
            lease = ctx.checkpointer.begin(&input.thread_id) => lease
                .with_context(|| format!("Failed to load thread {}", input.thread_id))?,
            _ = event_tx.closed() => {
                anyhow::bail!("Consumer disconnected while waiting for thread {}", input.thread_id)
            }
        };

        let state = TurnState::new(input, lease.thread(), delivery).with_run_id(run_id);

        let timeout = ctx.config.execution_timeout;
        let state = match tokio::time::timeout(
            timeout,
            Self::run_stages(ctx, lease, state, &event_tx, progress),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("Turn timed out after {:?}", timeout),
        };

        let total_duration = start_time.elapsed().as_millis() as u64;
        event_tx
            .send(StreamEvent::EndStream {
                status: "success".to_string(),
                total_duration_ms: total_duration,
            })
            .await?;

        tracing::info!(
            run_id = %state.run_id,
            thread_id = %state.thread_id,
            summarized = state.summarized,
            duration_ms = total_duration,
            "Turn completed"
        );
        Ok(())
    }

    /// Run every stage, commit the thread, then emit the output
    async fn run_stages(
        ctx: &GraphContext,
        lease: CheckpointLease,
        mut state: TurnState,
        event_tx: &EventSender,
        progress: &watch::Sender<Option<Stage>>,
    ) -> Result<TurnState> {
        let config = &ctx.config;
        let input_node = InputNode;
        let rewrite_node = RewriteNode::new(Arc::clone(&ctx.client), Arc::clone(config));
        let retrieval_node = RetrievalNode::new(
            Arc::clone(&ctx.context_store),
            config.local_k,
            config.web_k,
            config.retrieval_timeout,
        );
        let answer_node = AnswerNode::new(Arc::clone(&ctx.client), Arc::clone(config));
        let summarize_node = SummarizeNode::new(Arc::clone(&ctx.client), Arc::clone(config));
        let output_node = OutputNode::new(config.fallback_language.clone());

        for node in [&input_node as &dyn Node, &rewrite_node, &retrieval_node, &answer_node] {
            Self::run_node(node, &mut state, event_tx, progress).await?;
        }

        match ctx.router.next(&state) {
            Transition::Summarize => {
                Self::run_node(&summarize_node, &mut state, event_tx, progress).await?
            }
            Transition::Continue => {}
        }

        let thread = state.to_thread(lease.thread());
        let saved = lease
            .commit(thread)
            .await
            .with_context(|| format!("Failed to persist thread {}", state.thread_id))?;
        tracing::debug!(thread_id = %saved.thread_id, version = saved.version, messages = saved.messages.len(), "Thread persisted");

        Self::run_node(&output_node, &mut state, event_tx, progress).await?;

        Ok(state)
    }

    async fn run_node(
        node: &dyn Node,
        state: &mut TurnState,
        event_tx: &EventSender,
        progress: &watch::Sender<Option<Stage>>,
    ) -> Result<()> {
        let stage = node.stage();
        progress.send_replace(Some(stage));

        event_tx.send(StreamEvent::NodeStarted { stage }).await?;
        let node_start = Instant::now();

        node.execute(state, event_tx.clone()).await?;

        let duration_ms = node_start.elapsed().as_millis() as u64;
        event_tx
            .send(StreamEvent::NodeCompleted { stage, duration_ms })
            .await?;

        tracing::debug!(run_id = %state.run_id, stage = %stage, duration_ms, "Stage completed");
        Ok(())
    }
}
