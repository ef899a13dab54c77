use crate::node::{EventSender, Node};
use crate::prompts;
use crate::types::{GraphConfig, Stage, StreamEvent, TurnState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use docmind_llm::{ChatClient, ChatRequest, Message};
use docmind_persist::ThreadMessage;
use std::sync::Arc;

/// Messages that survive compaction
pub const KEEP_RECENT_MESSAGES: usize = 2;

/// Folds history into the running summary and marks old messages for removal
pub struct SummarizeNode {
    client: Arc<dyn ChatClient>,
    config: Arc<GraphConfig>,
}

impl SummarizeNode {
    pub fn new(client: Arc<dyn ChatClient>, config: Arc<GraphConfig>) -> Self {
        Self { client, config }
    }

    /// Produce an updated summary, `None` when the model returned nothing usable
    pub async fn summarize(&self, summary: &str, history: &[ThreadMessage]) -> Result<Option<String>> {
        let llm = &self.config.utility_llm;
        let request = ChatRequest::new(
            llm.model.clone(),
            vec![
                Message::system(prompts::summarization_prompt(summary, history)),
                Message::human(prompts::SUMMARIZE_INSTRUCTION),
            ],
        )
        .with_options(llm.chat_options());

        let response = self
            .client
            .chat(request)
            .await
            .context("Conversation summarization failed")?;

        let text = response.text_or_empty().trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[async_trait]
impl Node for SummarizeNode {
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()> {
        let Some(summary) = self.summarize(&state.summary, &state.messages).await? else {
            tracing::warn!(
                run_id = %state.run_id,
                thread_id = %state.thread_id,
                "Summarizer returned an empty summary, keeping history as is"
            );
            return Ok(());
        };

        event_tx
            .send(StreamEvent::Message {
                stage: Stage::SummarizeConversation,
                content: summary.clone(),
            })
            .await?;

        let cutoff = state.messages.len().saturating_sub(KEEP_RECENT_MESSAGES);
        state.pending_removals = state.messages[..cutoff].iter().map(|m| m.id.clone()).collect();
        state.summary = summary;
        state.summarized = true;

        tracing::info!(
            thread_id = %state.thread_id,
            removed = state.pending_removals.len(),
            "conversation summarized"
        );
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::SummarizeConversation
    }
}
