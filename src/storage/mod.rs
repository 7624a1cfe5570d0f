/// Storage backends for the alert document
pub mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

#[cfg(test)]
pub use backend::MockStorageBackend;
