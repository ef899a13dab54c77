use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Version conflict on thread {thread_id}: expected {expected}, found {found}")]
    VersionConflict {
        thread_id: String,
        expected: u64,
        found: u64,
    },

    #[error("Corrupted checkpoint for thread {thread_id}: {reason}")]
    Corrupted { thread_id: String, reason: String },

    #[error("Checkpoint store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PersistError>;
