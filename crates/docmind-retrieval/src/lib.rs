pub mod document;
pub mod memory;
pub mod store;

pub use document::{Document, DocumentMetadata, Pool};
pub use memory::InMemoryContextStore;
pub use store::ContextStore;
