use crate::node::{EventSender, Node};
use crate::types::{Stage, StreamEvent, TurnOutput, TurnState};
use anyhow::Result;
use async_trait::async_trait;

/// Emits the turn's final answer and provenance
pub struct OutputNode {
    fallback_language: String,
}

impl OutputNode {
    pub fn new(fallback_language: impl Into<String>) -> Self {
        Self {
            fallback_language: fallback_language.into(),
        }
    }
}

#[async_trait]
impl Node for OutputNode {
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()> {
        let output = TurnOutput {
            thread_id: state.thread_id.clone(),
            answer: state.answer.clone().unwrap_or_default(),
            documents: state.documents.clone(),
            language: state.language(&self.fallback_language),
            summarized: state.summarized,
        };

        event_tx.send(StreamEvent::Output { output }).await?;
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::ParseOutput
    }
}
