use anyhow::Result;
use async_trait::async_trait;
use crate::types::{Stage, StreamEvent, TurnState};
use tokio::sync::mpsc;

pub type EventSender = mpsc::Sender<StreamEvent>;

/// Core abstraction for one stage of a turn
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute the stage, mutating turn state and emitting events
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()>;

    /// Stage this node reports its events under
    fn stage(&self) -> Stage;
}
