use crate::types::config::DeliveryMode;
use chrono::Utc;
use docmind_persist::{ConversationThread, ThreadMessage, ThreadSummary};
use docmind_retrieval::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    pub thread_id: String,
    pub question: String,
}

impl TurnInput {
    pub fn new(thread_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            question: question.into(),
        }
    }
}

/// Normalized question produced by the rewrite stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewrittenQuestion {
    pub language: String,
    pub question: String,
}

/// Transient per-turn state threaded through every node
///
/// History is append-only for the duration of the turn; compaction is recorded
/// in `pending_removals` and applied when the state is projected back into a
/// [`ConversationThread`].
#[derive(Debug, Clone)]
pub struct TurnState {
    pub run_id: String,
    pub thread_id: String,
    pub question: String,
    pub rewritten: Option<RewrittenQuestion>,
    pub local_context: Vec<Document>,
    pub web_context: Vec<Document>,
    pub messages: Vec<ThreadMessage>,
    pub summary: String,
    pub summarized: bool,
    pub answer: Option<String>,
    pub documents: Vec<Document>,
    pub pending_removals: Vec<String>,
    pub delivery: DeliveryMode,
}

impl TurnState {
    pub fn new(input: TurnInput, thread: &ConversationThread, delivery: DeliveryMode) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            thread_id: input.thread_id,
            question: input.question,
            rewritten: None,
            local_context: Vec::new(),
            web_context: Vec::new(),
            messages: thread.messages.clone(),
            summary: thread.summary_text().to_string(),
            summarized: false,
            answer: None,
            documents: Vec::new(),
            pending_removals: Vec::new(),
            delivery,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Question used for retrieval and generation
    pub fn effective_question(&self) -> &str {
        self.rewritten
            .as_ref()
            .map_or(self.question.as_str(), |r| r.question.as_str())
    }

    pub fn language(&self, fallback: &str) -> String {
        self.rewritten
            .as_ref()
            .map_or_else(|| fallback.to_string(), |r| r.language.clone())
    }

    pub fn add_message(&mut self, message: ThreadMessage) {
        self.messages.push(message);
    }

    /// Project the turn back onto the thread it was loaded from
    pub fn to_thread(&self, base: &ConversationThread) -> ConversationThread {
        let removed: HashSet<&str> = self.pending_removals.iter().map(String::as_str).collect();

        let summary = if self.summarized {
            Some(ThreadSummary {
                text: self.summary.clone(),
                generated_at: Utc::now(),
                messages_count: self.messages.len(),
            })
        } else {
            base.summary.clone()
        };

        ConversationThread {
            thread_id: base.thread_id.clone(),
            messages: self
                .messages
                .iter()
                .filter(|m| !removed.contains(m.id.as_str()))
                .cloned()
                .collect(),
            summary,
            version: base.version,
            created_at: base.created_at,
            updated_at: base.updated_at,
        }
    }
}
