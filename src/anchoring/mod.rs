// src/anchoring/mod.rs

//! Anchoring a state to a wall-clock instant.
//!
//! An [`AnchorManager`] binds a [`Circuit`] and an execution backend. It
//! records the state the backend produces for the circuit together with an
//! anchor time, compares live states against it, applies the time-drift
//! heuristic and persists the anchor in the two-line format of [`persist`].
//!
//! The drift is a fixed rotation `Rx(Δt·π/4)` on qubit 0 appended to the
//! bound circuit, where `Δt` is the forward time shift in seconds. It is a
//! reproducible transformation with no physical model behind it.

pub mod persist;

pub use persist::{check_timestamp_range, decode_anchor, encode_anchor, format_timestamp, parse_timestamp};

use crate::circuits::Circuit;
use crate::config::{validate_threshold, Config};
use crate::core::constants::anchor_constants::{
    DEFAULT_FIDELITY_THRESHOLD, DEFAULT_NORM_TOLERANCE, DRIFT_RADIANS_PER_SECOND,
};
use crate::core::{QanchorError, Result, StateVector};
use crate::operations::Operation;
use crate::simulation::{ExecutionBackend, Simulator};
use crate::validation::checked_statevector;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A state paired with the instant it was anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Normalized state produced by the backend or loaded from a file.
    pub state: StateVector,
    /// Serialized as an ISO-8601 UTC string.
    pub anchor_time: DateTime<Utc>,
}

impl AnchorRecord {
    /// The anchor time in canonical text form.
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.anchor_time)
    }
}

/// Owns one circuit, its current state and the anchor time.
#[derive(Debug)]
pub struct AnchorManager<B = Simulator> {
    backend: B,
    circuit: Circuit,
    current_state: Option<StateVector>,
    anchor_time: DateTime<Utc>,
    compare_threshold: f64,
    normalization_tolerance: f64,
}

impl<B: ExecutionBackend> AnchorManager<B> {
    /// Creates a manager anchored at the current time, with no state yet.
    pub fn new(circuit: Circuit, backend: B) -> Self {
        Self::with_anchor_time(circuit, backend, Utc::now())
    }

    /// Creates a manager anchored at `anchor_time`, with no state yet.
    pub fn with_anchor_time(circuit: Circuit, backend: B, anchor_time: DateTime<Utc>) -> Self {
        Self {
            backend,
            circuit,
            current_state: None,
            anchor_time,
            compare_threshold: DEFAULT_FIDELITY_THRESHOLD,
            normalization_tolerance: DEFAULT_NORM_TOLERANCE,
        }
    }

    /// Creates a manager using the thresholds in `config`.
    pub fn with_config(circuit: Circuit, backend: B, config: &Config) -> Result<Self> {
        config.validate()?;
        let mut manager = Self::new(circuit, backend);
        manager.compare_threshold = config.compare_threshold;
        manager.normalization_tolerance = config.normalization_tolerance;
        Ok(manager)
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The current state, if one has been initialized or loaded.
    pub fn state(&self) -> Option<&StateVector> {
        self.current_state.as_ref()
    }

    pub fn anchor_time(&self) -> DateTime<Utc> {
        self.anchor_time
    }

    /// Runs `circuit` on the backend and makes the result the current state.
    ///
    /// `circuit` becomes the bound circuit. On failure the manager is left
    /// unchanged.
    pub fn initialize_state(&mut self, circuit: Circuit) -> Result<&StateVector> {
        let state = self.execute(&circuit, "initialize_state")?;
        self.circuit = circuit;
        let state = self.current_state.insert(state);
        Ok(&*state)
    }

    /// Sets the anchor time to `time` (or now), initializes the state from
    /// `circuit` and returns the new anchor.
    ///
    /// A `time` whose year falls outside `0000..=9999` cannot be persisted
    /// and is rejected with `InvalidState`.
    pub fn anchor_state(&mut self, circuit: Circuit, time: Option<DateTime<Utc>>) -> Result<AnchorRecord> {
        let anchor_time = time.unwrap_or_else(Utc::now);
        check_timestamp_range(&anchor_time)?;
        let state = self.execute(&circuit, "anchor_state")?;
        self.circuit = circuit;
        self.anchor_time = anchor_time;
        self.current_state = Some(state.clone());
        debug!(anchor_time = %format_timestamp(&anchor_time), qubits = state.num_qubits(), "anchored state");
        Ok(AnchorRecord { state, anchor_time })
    }

    /// Snapshot of the current anchor.
    pub fn record(&self) -> Result<AnchorRecord> {
        let state = self.require_state("record")?;
        Ok(AnchorRecord {
            state: state.clone(),
            anchor_time: self.anchor_time,
        })
    }

    /// `true` if `fidelity(current, candidate) > 1 - threshold`.
    ///
    /// # Errors
    /// * `UninitializedState` if no state is set.
    /// * `InvalidConfig` if `threshold` is outside `[0, 1)`.
    /// * `DimensionMismatch` if the candidate has a different dimension.
    pub fn compare_states(&self, candidate: &StateVector, threshold: f64) -> Result<bool> {
        let current = self.require_state("compare_states")?;
        validate_threshold("threshold", threshold)?;
        let fidelity = current.fidelity(candidate)?;
        debug!(fidelity, threshold, "compared against anchored state");
        Ok(fidelity > 1.0 - threshold)
    }

    /// [`compare_states`](Self::compare_states) with the configured threshold.
    pub fn compare_states_default(&self, candidate: &StateVector) -> Result<bool> {
        self.compare_states(candidate, self.compare_threshold)
    }

    /// Moves the anchor `forward_seconds` ahead, applying the drift, and
    /// returns the new anchor time.
    pub fn time_travel(&mut self, forward_seconds: i64) -> Result<DateTime<Utc>> {
        let offset = TimeDelta::try_seconds(forward_seconds)
            .ok_or_else(|| QanchorError::invalid_state(format!("{} seconds is out of range", forward_seconds)))?;
        let future_time = self.anchor_time.checked_add_signed(offset).ok_or_else(|| {
            QanchorError::invalid_state(format!(
                "anchor time {} + {}s overflows",
                format_timestamp(&self.anchor_time),
                forward_seconds
            ))
        })?;
        self.apply_time_dilation(future_time)?;
        Ok(future_time)
    }

    /// The drift transform.
    ///
    /// When `new_time` is after the anchor time, appends `Rx(Δt·π/4)` on
    /// qubit 0 to the bound circuit and re-derives the state through the
    /// backend. In every successful case the anchor time becomes `new_time`.
    /// If the backend fails, or `new_time` is outside the persistable year
    /// range, nothing is changed.
    pub fn apply_time_dilation(&mut self, new_time: DateTime<Utc>) -> Result<()> {
        check_timestamp_range(&new_time)?;
        let delta = new_time.signed_duration_since(self.anchor_time);
        if delta <= TimeDelta::zero() {
            self.anchor_time = new_time;
            return Ok(());
        }

        let seconds = elapsed_seconds(delta);
        let angle = seconds * DRIFT_RADIANS_PER_SECOND;
        let mut drifted = self.circuit.clone();
        drifted.add_operation(Operation::rx(0, angle));
        let state = self.execute(&drifted, "apply_time_dilation")?;

        debug!(seconds, angle, "applied drift rotation");
        self.circuit = drifted;
        self.current_state = Some(state);
        self.anchor_time = new_time;
        Ok(())
    }

    /// Writes the current anchor to `path`.
    pub fn save_state(&self, path: impl AsRef<Path>) -> Result<()> {
        let record = self.record().map_err(|_| QanchorError::uninitialized("save_state"))?;
        persist::write_anchor_file(&record, path.as_ref())
    }

    /// Replaces the current state and anchor time with those stored at
    /// `path`. The bound circuit is kept.
    pub fn load_state(&mut self, path: impl AsRef<Path>) -> Result<AnchorRecord> {
        let record = persist::read_anchor_file(path.as_ref(), Some(self.normalization_tolerance))?;
        self.current_state = Some(record.state.clone());
        self.anchor_time = record.anchor_time;
        Ok(record)
    }

    /// Fails with `UninitializedState` unless a state is set.
    pub fn verify_anchored_state(&self) -> Result<()> {
        self.require_state("verify_anchored_state").map(|_| ())
    }

    fn require_state(&self, operation: &str) -> Result<&StateVector> {
        self.current_state
            .as_ref()
            .ok_or_else(|| QanchorError::uninitialized(operation))
    }

    fn execute(&self, circuit: &Circuit, operation: &str) -> Result<StateVector> {
        checked_statevector(&self.backend, circuit, operation, self.normalization_tolerance)
    }
}

fn elapsed_seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_seconds() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::operations::Gate;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn hadamard() -> Circuit {
        CircuitBuilder::new(1).gate(0, Gate::H).build()
    }

    #[test]
    fn test_uninitialized_operations_fail() {
        let manager = AnchorManager::new(hadamard(), Simulator::new());
        let candidate = StateVector::zero_state(1).unwrap();
        assert!(matches!(manager.compare_states(&candidate, 1e-5), Err(QanchorError::UninitializedState { .. })));
        assert!(matches!(manager.verify_anchored_state(), Err(QanchorError::UninitializedState { .. })));
        match manager.save_state("unused.txt") {
            Err(QanchorError::UninitializedState { operation }) => assert_eq!(operation, "save_state"),
            other => panic!("expected uninitialized error, got {:?}", other),
        }
    }

    #[test]
    fn test_anchor_state_sets_time_and_state() {
        let mut manager = AnchorManager::new(Circuit::new(1), Simulator::new());
        let record = manager.anchor_state(hadamard(), Some(t0())).unwrap();
        assert_eq!(record.anchor_time, t0());
        assert_eq!(record.timestamp(), "2024-01-01T00:00:00Z");
        assert_eq!(manager.state(), Some(&record.state));
        assert_eq!(manager.circuit(), &hadamard());
        assert!(manager.verify_anchored_state().is_ok());
    }

    #[test]
    fn test_backend_failure_leaves_manager_unchanged() {
        let mut manager = AnchorManager::with_anchor_time(hadamard(), Simulator::new(), t0());
        manager.initialize_state(hadamard()).unwrap();
        let before = manager.record().unwrap();
        let bad = CircuitBuilder::new(1).gate(4, Gate::X).build();
        let err = manager.anchor_state(bad, None).unwrap_err();
        assert!(matches!(err, QanchorError::Backend { .. }));
        assert_eq!(manager.record().unwrap(), before);
        assert_eq!(manager.circuit(), &hadamard());
    }

    #[test]
    fn test_backward_drift_only_moves_time() {
        let mut manager = AnchorManager::with_anchor_time(hadamard(), Simulator::new(), t0());
        manager.initialize_state(hadamard()).unwrap();
        let earlier = manager.time_travel(-30).unwrap();
        assert_eq!(earlier, t0() - TimeDelta::seconds(30));
        assert_eq!(manager.anchor_time(), earlier);
        assert_eq!(manager.circuit().len(), 1);
        manager.time_travel(0).unwrap();
        assert_eq!(manager.circuit().len(), 1);
    }

    #[test]
    fn test_fractional_drift_angle() {
        let mut manager = AnchorManager::with_anchor_time(Circuit::new(1), Simulator::new(), t0());
        manager.apply_time_dilation(t0() + TimeDelta::milliseconds(500)).unwrap();
        assert_eq!(manager.circuit().operations(), &[Operation::rx(0, 0.5 * DRIFT_RADIANS_PER_SECOND)]);
        // The drift re-derives the state even before initialization
        assert!(manager.state().is_some());
    }

    #[test]
    fn test_unpersistable_anchor_times_are_rejected() {
        let near_end = Utc.with_ymd_and_hms(9999, 12, 31, 23, 0, 0).unwrap();
        let mut manager = AnchorManager::new(hadamard(), Simulator::new());
        let record = manager.anchor_state(hadamard(), Some(near_end)).unwrap();

        let err = manager.time_travel(7200).unwrap_err();
        assert!(matches!(err, QanchorError::InvalidState { .. }));
        assert_eq!(manager.record().unwrap(), record);
        assert_eq!(manager.circuit().len(), 1);

        let too_early = DateTime::<Utc>::MIN_UTC + TimeDelta::days(1);
        assert!(matches!(
            manager.anchor_state(hadamard(), Some(too_early)),
            Err(QanchorError::InvalidState { .. })
        ));
        assert_eq!(manager.anchor_time(), near_end);

        // A manager constructed at such a time still refuses to save it
        let mut stray = AnchorManager::with_anchor_time(hadamard(), Simulator::new(), too_early);
        stray.initialize_state(hadamard()).unwrap();
        assert!(matches!(stray.save_state("unused.txt"), Err(QanchorError::InvalidState { .. })));
    }

    #[test]
    fn test_time_travel_overflow_is_an_error() {
        let mut manager = AnchorManager::new(hadamard(), Simulator::new());
        assert!(manager.time_travel(i64::MAX).is_err());
        assert_eq!(manager.circuit().len(), 1);
    }
}
