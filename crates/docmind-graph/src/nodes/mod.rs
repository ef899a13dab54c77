mod answer_node;
mod input_node;
mod output_node;
mod rewrite_node;
mod search_node;
mod summarize_node;

pub use answer_node::AnswerNode;
pub use input_node::InputNode;
pub use output_node::OutputNode;
pub use rewrite_node::{parse_rewritten_question, RewriteNode};
pub use search_node::RetrievalNode;
pub use summarize_node::{SummarizeNode, KEEP_RECENT_MESSAGES};
