pub mod checkpointer;
pub mod dbs;
pub mod error;
pub mod models;
pub mod store;

pub use checkpointer::{CheckpointLease, Checkpointer};
pub use dbs::{FileCheckpointStore, InMemoryCheckpointStore};
pub use error::{PersistError, Result};
pub use models::{ConversationThread, MessageRole, ThreadMessage, ThreadSummary};
pub use store::CheckpointStore;
