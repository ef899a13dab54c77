use crate::node::{EventSender, Node};
use crate::types::{Stage, TurnState};
use anyhow::Result;
use async_trait::async_trait;

/// Normalizes the raw question before anything else sees it
///
/// Blank questions are passed on as empty strings; the rewrite stage copes with them.
pub struct InputNode;

#[async_trait]
impl Node for InputNode {
    async fn execute(&self, state: &mut TurnState, _event_tx: EventSender) -> Result<()> {
        let trimmed = state.question.trim();
        if trimmed.len() != state.question.len() {
            state.question = trimmed.to_string();
        }
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::ParseInput
    }
}
