pub mod config;
pub mod events;
pub mod output;
pub mod state;

pub use config::{DeliveryMode, GraphConfig, LLMConfig};
pub use events::{Stage, StreamEvent};
pub use output::TurnOutput;
pub use state::{RewrittenQuestion, TurnInput, TurnState};
