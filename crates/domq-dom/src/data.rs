//! Keyed data store
//!
//! Per-document side table mapping node ids to JSON records. Lives inside
//! the `Document`, so it is dropped with it.

use std::collections::HashMap;

use serde_json::Value;

use crate::NodeId;

/// Record of key/value pairs attached to one node
pub type DataRecord = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct DataStore {
    records: HashMap<NodeId, DataRecord>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record stored for a node
    pub fn get(&self, node: NodeId) -> Option<&DataRecord> {
        self.records.get(&node)
    }

    /// Single stored value
    pub fn get_value(&self, node: NodeId, key: &str) -> Option<&Value> {
        self.records.get(&node)?.get(key)
    }

    /// Store a value, creating the record on first use
    pub fn set(&mut self, node: NodeId, key: &str, value: Value) {
        self.records.entry(node).or_default().insert(key.to_string(), value);
    }

    /// Remove one key, or the whole record when `key` is `None`.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, node: NodeId, key: Option<&str>) -> bool {
        match key {
            None => self.records.remove(&node).is_some(),
            Some(key) => {
                let Some(record) = self.records.get_mut(&node) else {
                    return false;
                };
                let removed = record.remove(key).is_some();
                if record.is_empty() {
                    self.records.remove(&node);
                }
                removed
            }
        }
    }

    /// Drop the records of freed nodes
    pub fn prune(&mut self, freed: &[NodeId]) {
        for node in freed {
            self.records.remove(node);
        }
    }

    /// Number of nodes with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
