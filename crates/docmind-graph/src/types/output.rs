use docmind_retrieval::Document;
use serde::{Deserialize, Serialize};

/// Result of one conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutput {
    pub thread_id: String,
    pub answer: String,
    /// Provenance: local documents first, then web
    pub documents: Vec<Document>,
    /// Language detected for the question
    pub language: String,
    /// Whether this turn compacted the history
    pub summarized: bool,
}
