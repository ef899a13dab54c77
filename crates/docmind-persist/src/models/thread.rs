use super::message::ThreadMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub text: String,
    pub generated_at: DateTime<Utc>,
    /// History length at the time the summary was produced
    pub messages_count: usize,
}

/// Durable, thread-scoped conversation state
///
/// `version` is 0 for a thread that has never been persisted and grows by one
/// on every successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub thread_id: String,
    #[serde(default)]
    pub messages: Vec<ThreadMessage>,
    #[serde(default)]
    pub summary: Option<ThreadSummary>,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationThread {
    pub fn new(thread_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
            summary: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Running summary text, empty when none has been produced yet
    pub fn summary_text(&self) -> &str {
        self.summary.as_ref().map_or("", |s| s.text.as_str())
    }
}
