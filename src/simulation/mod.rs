// src/simulation/mod.rs

//! The execution backend.
//!
//! [`ExecutionBackend`] is the boundary between the anchoring components and
//! whatever turns a circuit into results: either the final amplitude vector
//! or a histogram of sampled bit-strings. [`Simulator`] is the in-process
//! dense statevector implementation.

mod results;
pub(crate) mod engine;

pub use results::SampleCounts;

use crate::circuits::Circuit;
use crate::config::SimulatorConfig;
use crate::core::{QanchorError, Result, StateVector};
use engine::SimulationEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, trace};

/// Turns circuit descriptions into amplitude vectors or sample histograms.
///
/// Calls are synchronous. A malformed circuit fails with
/// [`QanchorError::Backend`]; no partial state is ever returned.
pub trait ExecutionBackend {
    /// Executes `circuit` and returns the final normalized state.
    fn statevector(&self, circuit: &Circuit) -> Result<StateVector>;

    /// Executes `circuit` `shots` times and histograms the measured bit-strings.
    fn sample(&self, circuit: &Circuit, shots: u64) -> Result<SampleCounts>;
}

impl<T: ExecutionBackend + ?Sized> ExecutionBackend for &T {
    fn statevector(&self, circuit: &Circuit) -> Result<StateVector> {
        (**self).statevector(circuit)
    }

    fn sample(&self, circuit: &Circuit, shots: u64) -> Result<SampleCounts> {
        (**self).sample(circuit, shots)
    }
}

impl<T: ExecutionBackend + ?Sized> ExecutionBackend for Arc<T> {
    fn statevector(&self, circuit: &Circuit) -> Result<StateVector> {
        (**self).statevector(circuit)
    }

    fn sample(&self, circuit: &Circuit, shots: u64) -> Result<SampleCounts> {
        (**self).sample(circuit, shots)
    }
}

/// Dense statevector simulator.
#[derive(Debug, Clone, Default)] // Allows Simulator::default() -> Simulator::new()
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator with explicit settings.
    pub fn with_config(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active settings.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Samples `circuit` with the configured default number of shots.
    pub fn run(&self, circuit: &Circuit) -> Result<SampleCounts> {
        self.sample(circuit, self.config.shots)
    }

    fn evolve(&self, circuit: &Circuit) -> Result<StateVector> {
        trace!(qubits = circuit.num_qubits(), ops = circuit.len(), "simulating circuit");
        let mut engine = SimulationEngine::init(circuit.num_qubits(), self.config.max_qubits)?;
        for op in circuit.operations() {
            engine.apply_operation(op)?;
        }
        engine.into_state()
    }

    fn sampling_seed(&self, state: &StateVector) -> u64 {
        if let Some(seed) = self.config.seed {
            return seed;
        }
        let mut hasher = DefaultHasher::new();
        for c in state.amplitudes() {
            c.re.to_ne_bytes().hash(&mut hasher);
            c.im.to_ne_bytes().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl ExecutionBackend for Simulator {
    fn statevector(&self, circuit: &Circuit) -> Result<StateVector> {
        self.evolve(circuit)
    }

    fn sample(&self, circuit: &Circuit, shots: u64) -> Result<SampleCounts> {
        if shots == 0 {
            return Err(QanchorError::backend("sample", "shots must be at least 1"));
        }
        let state = self.evolve(circuit)?;
        let probabilities = state.probabilities();

        let mut cumulative = Vec::with_capacity(probabilities.len());
        let mut total = 0.0;
        for p in &probabilities {
            total += p;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(QanchorError::backend("sample", "state has zero total probability"));
        }

        let measured: Vec<usize> = match circuit.measured_qubits() {
            m if m.is_empty() => (0..circuit.num_qubits()).collect(),
            m => m.into_iter().map(|q| q.0).collect(),
        };

        let mut rng = StdRng::seed_from_u64(self.sampling_seed(&state));
        let mut counts = SampleCounts::new(shots);
        for _ in 0..shots {
            let draw = rng.random::<f64>() * total;
            let index = cumulative.partition_point(|c| *c <= draw).min(cumulative.len() - 1);
            counts.record(bitstring(index, &measured));
        }
        debug!(shots, outcomes = counts.counts().len(), "sampled circuit");
        Ok(counts)
    }
}

/// Bits of `index` for `qubits`, highest qubit first.
fn bitstring(index: usize, qubits: &[usize]) -> String {
    qubits
        .iter()
        .rev()
        .map(|q| if (index >> q) & 1 == 1 { '1' } else { '0' })
        .collect()
}
