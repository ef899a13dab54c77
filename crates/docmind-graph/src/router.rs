use crate::types::TurnState;

/// Decides what happens after the answer is appended to history
pub trait Router: Send + Sync {
    fn next(&self, state: &TurnState) -> Transition;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Summarize,
}

/// Summarize once history grows strictly past `threshold` messages
pub struct ConversationRouter {
    threshold: usize,
}

impl ConversationRouter {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Router for ConversationRouter {
    fn next(&self, state: &TurnState) -> Transition {
        if state.messages.len() > self.threshold {
            Transition::Summarize
        } else {
            Transition::Continue
        }
    }
}
