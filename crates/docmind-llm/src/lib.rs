pub mod config;
pub mod openai;
pub mod streaming;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, OpenAIConfig};
pub use openai::OpenAIClient;
pub use streaming::StreamEvent;
pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
pub use types::Message;
