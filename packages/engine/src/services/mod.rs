//! Collaborators behind traits: remote text generation and key-value storage.
//!
//! Domain code only sees the traits; the browser adapters live next to them
//! and tests use the in-memory versions.

pub mod storage;
pub mod text_generation;

pub use storage::{KeyValueStore, LocalStorage, MemoryStore, StorageError};
pub use text_generation::{GeminiClient, GenerationError, GenerationRequest, TextGenerator};
