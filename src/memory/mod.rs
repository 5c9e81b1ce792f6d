// src/memory/mod.rs

//! Keyed snapshot storage.
//!
//! [`MemoryStore`] maps string keys to [`StateVector`]s and remembers the
//! order in which keys were first inserted. It is internally synchronized,
//! so one store can be shared behind an `Arc` by several components; every
//! instance is independent.

use crate::circuits::Circuit;
use crate::core::{Result, StateVector};
use crate::simulation::ExecutionBackend;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Entries {
    /// Keys and states in insertion order.
    ordered: Vec<(String, StateVector)>,
    /// Key -> position in `ordered`.
    index: HashMap<String, usize>,
}

/// Insertion-ordered map from keys to state vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Entries>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`. A new key goes to the end of the
    /// insertion order; an existing key keeps its position.
    pub fn store(&self, key: impl Into<String>, state: StateVector) {
        let key = key.into();
        let mut entries = self.entries.write();
        match entries.index.get(&key).copied() {
            Some(pos) => {
                entries.ordered[pos].1 = state;
                debug!(key = %key, "overwrote stored state");
            }
            None => {
                let pos = entries.ordered.len();
                entries.index.insert(key.clone(), pos);
                debug!(key = %key, "stored state");
                entries.ordered.push((key, state));
            }
        }
    }

    /// Executes `circuit` on `backend` and stores the resulting state under `key`.
    pub fn store_circuit<B>(&self, key: impl Into<String>, circuit: &Circuit, backend: &B) -> Result<StateVector>
    where
        B: ExecutionBackend + ?Sized,
    {
        let state = backend.statevector(circuit)?;
        self.store(key, state.clone());
        Ok(state)
    }

    /// Returns a copy of the state under `key`, or `None`.
    pub fn retrieve(&self, key: &str) -> Option<StateVector> {
        let entries = self.entries.read();
        entries.index.get(key).map(|pos| entries.ordered[*pos].1.clone())
    }

    /// `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().index.contains_key(key)
    }

    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        let Some(pos) = entries.index.remove(key) else {
            return false;
        };
        entries.ordered.remove(pos);
        // Entries after `pos` shifted down by one
        let Entries { ordered, index } = &mut *entries;
        for (i, (k, _)) in ordered.iter().enumerate().skip(pos) {
            index.insert(k.clone(), i);
        }
        debug!(key = %key, "deleted state");
        true
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let removed = entries.ordered.len();
        entries.ordered.clear();
        entries.index.clear();
        debug!(removed, "cleared memory store");
    }

    /// Keys in insertion order.
    pub fn list_keys(&self) -> Vec<String> {
        self.entries.read().ordered.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of stored entries.
    pub fn usage_count(&self) -> usize {
        self.entries.read().ordered.len()
    }

    /// `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.usage_count() == 0
    }
}
