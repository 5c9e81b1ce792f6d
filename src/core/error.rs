//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Index of a qubit within a circuit.
/// Qubit `i` corresponds to bit `i` of a basis index (little-endian), so
/// qubit 0 is the least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q[{}]", self.0)
    }
}

/// Result type alias for anchoring operations.
pub type Result<T> = std::result::Result<T, QanchorError>;

/// Errors raised by the anchoring subsystem.
///
/// Lookups that may legitimately miss (`MemoryStore::retrieve`,
/// `SyncRegistry::get_synchronized_time`) return `Option` instead.
#[derive(Error, Debug)]
pub enum QanchorError {
    /// The execution backend rejected the circuit or produced malformed output.
    #[error("backend error during {operation}: {message}")]
    Backend {
        /// Operation that invoked the backend.
        operation: String,
        /// Failure description.
        message: String,
    },

    /// An anchor manager operation needs a state that was never initialized.
    #[error("state not initialized: {operation} requires an initialized state")]
    UninitializedState {
        /// Operation that was attempted.
        operation: String,
    },

    /// A node was adjusted before it was ever synchronized.
    #[error("node '{node_id}' is not synchronized")]
    UnsynchronizedNode {
        /// Node identifier.
        node_id: String,
    },

    /// A persisted anchor file does not follow the two-line format.
    #[error("malformed anchor file '{path}': {reason}")]
    MalformedPersistence {
        /// Source path, or `<memory>` for string decoding.
        path: String,
        /// What was wrong.
        reason: String,
    },

    /// Amplitude vector violates a structural invariant.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Failure description.
        message: String,
    },

    /// Two state vectors of different dimension were combined.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension encountered.
        actual: usize,
    },

    /// Circuit text could not be parsed.
    #[error("circuit parse error at line {line}: {message}")]
    CircuitParse {
        /// 1-based line number.
        line: usize,
        /// Failure description.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration '{name}': {reason}")]
    InvalidConfig {
        /// Field name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// File system failure while saving or loading.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl QanchorError {
    /// Create a backend error.
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an uninitialized state error.
    pub fn uninitialized(operation: impl Into<String>) -> Self {
        Self::UninitializedState {
            operation: operation.into(),
        }
    }

    /// Create a malformed persistence error.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPersistence {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = QanchorError::backend("initialize_state", "qubit q[3] out of range");
        assert!(err.to_string().contains("initialize_state"));
        assert!(err.to_string().contains("q[3]"));

        let err = QanchorError::UnsynchronizedNode { node_id: "node_7".to_string() };
        assert!(err.to_string().contains("node_7"));

        let err = QanchorError::malformed("anchor.txt", "missing Statevector line");
        assert!(err.to_string().contains("anchor.txt"));
        assert!(err.to_string().contains("Statevector"));
    }

    #[test]
    fn test_qubit_display() {
        assert_eq!(QubitId(2).to_string(), "q[2]");
    }
}
