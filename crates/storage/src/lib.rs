//! Storage abstraction and implementations for marketplace records.
//!
//! This crate provides a trait-based storage interface with an in-memory
//! implementation and a JSON-directory implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory_storage;
pub mod json_storage;

pub use trait_::{shared, AddonFilter, Result, SharedStorage, Storage, StorageError};
pub use memory_storage::MemoryStorage;
pub use json_storage::JsonStorage;
