use crate::types::output::TurnOutput;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage, used as the display name on every stage-scoped event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ParseInput,
    RewriteQuestion,
    /// Fan-out over both pools
    Retrieve,
    SearchLocal,
    SearchWeb,
    GenerateAnswer,
    SummarizeConversation,
    ParseOutput,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParseInput => "parse_input",
            Stage::RewriteQuestion => "rewrite_question",
            Stage::Retrieve => "retrieve",
            Stage::SearchLocal => "search_local",
            Stage::SearchWeb => "search_web",
            Stage::GenerateAnswer => "generate_answer",
            Stage::SummarizeConversation => "summarize_conversation",
            Stage::ParseOutput => "parse_output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified StreamEvent for turn orchestration
///
/// Every event a turn emits, from start to end. Consumers that only want answer
/// tokens filter on `Message` events of [`Stage::GenerateAnswer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Turn started
    InitStream {
        run_id: String,
        thread_id: String,
        timestamp: i64,
    },

    NodeStarted {
        stage: Stage,
    },

    /// Text produced by a generator call within a stage
    Message {
        stage: Stage,
        content: String,
    },

    NodeCompleted {
        stage: Stage,
        duration_ms: u64,
    },

    /// Generator output for a stage finished
    Done {
        stage: Stage,
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },

    /// Final result, emitted after the thread state was persisted
    Output {
        output: TurnOutput,
    },

    /// Fatal error occurred
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<Stage>,
    },

    /// Turn completed
    EndStream {
        status: String,
        total_duration_ms: u64,
    },
}
