pub mod builder;
pub mod graph;
pub mod json;
pub mod node;
pub mod nodes;
pub mod prompts;
pub mod router;
pub mod streaming;
pub mod types;

pub use builder::GraphBuilder;
pub use graph::Graph;
pub use node::{EventSender, Node};
pub use router::{ConversationRouter, Router, Transition};
pub use streaming::{demultiplex, format_chunk, CHUNK_DELIMITER};

pub use types::{
    DeliveryMode, GraphConfig, LLMConfig, RewrittenQuestion, Stage, StreamEvent, TurnInput,
    TurnOutput, TurnState,
};
