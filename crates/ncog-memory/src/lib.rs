//! Short-term/long-term key-value memory with file persistence
//!
//! The store keeps a capacity-bounded FIFO buffer for short-term items and a
//! flat string-keyed map for long-term entries. A file-backed store persists
//! the long-term map as a single JSON object per instance. The format
//! carries no schema version field, so any future migration must introduce
//! explicit versioning first.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod store;

pub use error::{MemoryError, Result};
pub use store::{MemoryStore, DEFAULT_SHORT_TERM_CAPACITY};
