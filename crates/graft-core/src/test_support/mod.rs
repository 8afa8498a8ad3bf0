//! Test utilities
//!
//! Available to other crates through the `test-utils` feature.

pub mod memory_store;

pub use memory_store::{InMemoryGraphStore, MemoryChunk, MemoryEdge, MemoryGraph, MemoryNode};
