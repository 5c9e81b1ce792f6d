// src/lib.rs

//! `qanchor` - anchoring quantum states to wall-clock time
//!
//! This library records the state an execution backend produces for a
//! circuit together with the instant it was captured, verifies live states
//! against a stored reference by fidelity, denoises states before storage,
//! keeps keyed snapshots, and tracks per-node logical clocks used to decide
//! when anchoring should happen across nodes.
//!
//! The built-in [`Simulator`] is a dense statevector backend; any type
//! implementing [`ExecutionBackend`] can stand in for it.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod config;
pub mod memory;
pub mod correction;
pub mod verification;
pub mod anchoring;
pub mod sync;

// Re-export the most common types for easier top-level use
pub use core::{QanchorError, QubitId, Result, StateVector};
pub use operations::{Axis, Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{ExecutionBackend, SampleCounts, Simulator};
pub use validation::check_normalization;
pub use config::{Config, SimulatorConfig};
pub use memory::MemoryStore;
pub use correction::ErrorCorrector;
pub use verification::{StateVerifier, VerificationResult};
pub use anchoring::{AnchorManager, AnchorRecord};
pub use sync::SyncRegistry;

// Example 1: Anchor, Drift and Compare
// Anchors the |+i> state, moves the anchor forward in time and checks that
// the drifted state no longer matches the original.
/// ```
/// use qanchor::{AnchorManager, CircuitBuilder, ExecutionBackend, Gate, Simulator, QanchorError};
///
/// let circuit = CircuitBuilder::new(1).gate(0, Gate::H).gate(0, Gate::S).build();
/// let mut manager = AnchorManager::new(circuit.clone(), Simulator::new());
/// let record = manager.anchor_state(circuit.clone(), None)?;
/// println!("Anchored at {}: {}", record.timestamp(), record.state);
///
/// // A fresh run of the same circuit matches the anchor
/// let fresh = Simulator::new().statevector(&circuit)?;
/// assert!(manager.compare_states(&fresh, 1e-5)?);
///
/// // Two seconds of drift rotate qubit 0 by pi/2
/// let later = manager.time_travel(2)?;
/// assert_eq!(later, record.anchor_time + chrono::TimeDelta::seconds(2));
/// assert!(!manager.compare_states(&record.state, 1e-5)?);
/// # Ok::<(), QanchorError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Verify, Correct and Store
// Flags a bit flip against a reference, then files a denoised state.
/// ```
/// use qanchor::{CircuitBuilder, ErrorCorrector, ExecutionBackend, Gate, MemoryStore, Simulator, StateVerifier};
///
/// let sim = Simulator::new();
/// let reference = sim.statevector(&CircuitBuilder::new(1).build())?;
/// let flipped = sim.statevector(&CircuitBuilder::new(1).gate(0, Gate::X).build())?;
///
/// let verifier = StateVerifier::new(reference.clone(), 1e-5)?;
/// let (changed, fidelity) = verifier.detect_state_change(&flipped)?;
/// assert!(changed);
/// assert!(fidelity < 1.0);
///
/// let corrector = ErrorCorrector::new();
/// let cleaned = corrector.correct_state(&reference)?;
/// let memory = MemoryStore::new();
/// memory.store("reference", cleaned);
/// assert_eq!(memory.list_keys(), vec!["reference".to_string()]);
/// # Ok::<(), qanchor::QanchorError>(())
/// ```
#[doc(hidden)]
const _: () = ();
