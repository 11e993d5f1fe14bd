//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::backend::SearchBackend`].

pub mod memory;

pub use memory::{MemoryBackend, MemoryRepo};
