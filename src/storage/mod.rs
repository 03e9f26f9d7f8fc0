//! Stream store abstraction and backends.
//!
//! The durable append-only storage engine is an external collaborator; the
//! router only needs `append` and `get`. The in-memory backend serves
//! embedded use, tests, and as a reference implementation.

mod memory;
mod traits;

pub use memory::InMemoryStreamStore;
pub use traits::{DocumentId, StoreError, StoredDocument, StreamStore};
