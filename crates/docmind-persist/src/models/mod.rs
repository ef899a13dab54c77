mod message;
mod thread;

pub use message::{MessageRole, ThreadMessage};
pub use thread::{ConversationThread, ThreadSummary};
