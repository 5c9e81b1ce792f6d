// src/sync/mod.rs

//! Per-node logical clocks.
//!
//! A [`SyncRegistry`] tracks one timestamp per node id, independent of any
//! quantum state. Nodes start *unsynchronized*; `synchronize_time` creates
//! an entry which `adjust_time` can then shift. All methods take `&self` and
//! hold the registry lock for the whole read-modify-write, so concurrent
//! adjustments of a node are never lost.

use crate::core::{QanchorError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Map from node id to that node's logical time.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    times: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node's time to `sync_time`, or now, and returns it.
    pub fn synchronize_time(&self, node_id: impl Into<String>, sync_time: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let node_id = node_id.into();
        let time = sync_time.unwrap_or_else(Utc::now);
        debug!(node = %node_id, time = %time, "synchronized node");
        self.times.lock().insert(node_id, time);
        time
    }

    /// Shifts the node's time by `offset` and returns the new value.
    ///
    /// # Errors
    /// * `UnsynchronizedNode` if the node has no entry.
    /// * `InvalidState` if the result falls outside the representable range;
    ///   the stored time is then unchanged.
    pub fn adjust_time(&self, node_id: &str, offset: TimeDelta) -> Result<DateTime<Utc>> {
        let mut times = self.times.lock();
        let time = times.get_mut(node_id).ok_or_else(|| QanchorError::UnsynchronizedNode {
            node_id: node_id.to_string(),
        })?;
        let adjusted = time.checked_add_signed(offset).ok_or_else(|| {
            QanchorError::invalid_state(format!("adjusting node '{}' by {} overflows", node_id, offset))
        })?;
        *time = adjusted;
        debug!(node = %node_id, offset = %offset, time = %adjusted, "adjusted node time");
        Ok(adjusted)
    }

    /// The node's time, or `None` if it is unsynchronized.
    pub fn get_synchronized_time(&self, node_id: &str) -> Option<DateTime<Utc>> {
        self.times.lock().get(node_id).copied()
    }

    /// `true` if the node exists and `|now - time| <= tolerance`.
    pub fn check_synchronization(&self, node_id: &str, tolerance: TimeDelta) -> bool {
        let Some(time) = self.get_synchronized_time(node_id) else {
            return false;
        };
        Utc::now().signed_duration_since(time).abs() <= tolerance
    }

    /// Returns every node to the unsynchronized state.
    pub fn clear_synchronizations(&self) {
        let mut times = self.times.lock();
        debug!(nodes = times.len(), "cleared synchronizations");
        times.clear();
    }

    /// Synchronized node ids, sorted.
    pub fn nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.times.lock().keys().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn len(&self) -> usize {
        self.times.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
