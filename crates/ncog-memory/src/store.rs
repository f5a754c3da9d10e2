//! The key-value memory store

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::*;

/// Default capacity of the short-term buffer
pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 5;

/// Short-term/long-term memory store.
///
/// Short-term storage is a bounded FIFO: storing into a full buffer evicts
/// the oldest item. Long-term storage is a string-keyed map persisted
/// immediately on every write when the store is file-backed.
#[derive(Debug)]
pub struct MemoryStore {
    short_term: VecDeque<Value>,
    short_term_capacity: usize,
    long_term: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an in-memory store with the default short-term capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SHORT_TERM_CAPACITY)
    }

    /// Create an in-memory store with an explicit short-term capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            short_term: VecDeque::with_capacity(capacity),
            short_term_capacity: capacity.max(1),
            long_term: BTreeMap::new(),
            path: None,
        }
    }

    /// Open a file-backed store, restoring any existing snapshot.
    ///
    /// A missing file is not an error: the store starts empty and the file
    /// is created on the first long-term write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = Self::new();
        store.path = Some(path.as_ref().to_path_buf());
        if path.as_ref().exists() {
            store.restore_from_disk()?;
        }
        Ok(store)
    }

    /// Store an item in short-term memory, evicting the oldest when full
    pub fn store_short_term(&mut self, item: Value) {
        if self.short_term.len() == self.short_term_capacity {
            self.short_term.pop_front();
        }
        self.short_term.push_back(item);
    }

    /// All short-term items, oldest first
    pub fn retrieve_short_term(&self) -> Vec<Value> {
        self.short_term.iter().cloned().collect()
    }

    /// Store a long-term entry; a file-backed store persists immediately
    pub fn store_long_term(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.long_term.insert(key.into(), value);
        if self.path.is_some() {
            self.snapshot_to_disk()?;
        }
        Ok(())
    }

    /// Retrieve a long-term entry
    pub fn retrieve_long_term(&self, key: &str) -> Option<&Value> {
        self.long_term.get(key)
    }

    /// Write the long-term map to the backing file as one flat JSON object
    pub fn snapshot_to_disk(&self) -> Result<()> {
        let path = self.path.as_ref().ok_or(MemoryError::NotFileBacked)?;
        let json = serde_json::to_string_pretty(&self.long_term)?;
        fs::write(path, json)?;
        log::debug!(
            "persisted {} long-term entries to {}",
            self.long_term.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the long-term map with the backing file's snapshot
    pub fn restore_from_disk(&mut self) -> Result<()> {
        let path = self.path.as_ref().ok_or(MemoryError::NotFileBacked)?;
        let data = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&data)?;
        match value {
            Value::Object(map) => {
                self.long_term = map.into_iter().collect();
                Ok(())
            }
            other => Err(MemoryError::invalid_format(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Number of short-term items currently held
    pub fn short_term_len(&self) -> usize {
        self.short_term.len()
    }

    /// Number of long-term entries
    pub fn long_term_len(&self) -> usize {
        self.long_term.len()
    }

    /// The backing file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
