// src/correction/mod.rs

//! Hard-threshold denoising of state vectors.
//!
//! [`ErrorCorrector::correct_state`] zeroes every amplitude whose magnitude
//! does not exceed the noise threshold and keeps the rest unchanged. The
//! result is **not** renormalized, so its total probability may be below 1;
//! callers that need a normalized state must not use a corrected vector as a
//! verifier reference or anchor.

use crate::circuits::Circuit;
use crate::config::{validate_threshold, Config};
use crate::core::constants::anchor_constants::{DEFAULT_NOISE_THRESHOLD, DEFAULT_NORM_TOLERANCE};
use crate::core::{Result, StateVector};
use crate::memory::MemoryStore;
use crate::simulation::{ExecutionBackend, Simulator};
use crate::validation::checked_statevector;
use num_complex::Complex;
use num_traits::Zero;
use tracing::debug;

/// Applies threshold correction and keeps its own store of corrected states.
#[derive(Debug)]
pub struct ErrorCorrector<B = Simulator> {
    backend: B,
    noise_threshold: f64,
    /// Allowed norm deviation of backend output before correction.
    normalization_tolerance: f64,
    corrected: MemoryStore,
}

impl ErrorCorrector<Simulator> {
    /// Corrector over the built-in simulator with the default threshold.
    pub fn new() -> Self {
        Self::with_backend(Simulator::new())
    }
}

impl Default for ErrorCorrector<Simulator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ExecutionBackend> ErrorCorrector<B> {
    /// Corrector over `backend` with the default threshold of `1e-3`.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            normalization_tolerance: DEFAULT_NORM_TOLERANCE,
            corrected: MemoryStore::new(),
        }
    }

    /// Corrector over `backend` using `config.noise_threshold` and
    /// `config.normalization_tolerance`.
    pub fn with_config(backend: B, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            noise_threshold: config.noise_threshold,
            normalization_tolerance: config.normalization_tolerance,
            corrected: MemoryStore::new(),
        })
    }

    /// The threshold used by [`correct_state`](Self::correct_state).
    pub fn noise_threshold(&self) -> f64 {
        self.noise_threshold
    }

    /// Zeroes amplitudes with `|c| <= noise_threshold`.
    pub fn correct_state(&self, state: &StateVector) -> Result<StateVector> {
        correct_with_threshold(state, self.noise_threshold)
    }

    /// Same as [`correct_state`](Self::correct_state) with an explicit threshold.
    pub fn correct_state_with_threshold(&self, state: &StateVector, noise_threshold: f64) -> Result<StateVector> {
        validate_threshold("noise_threshold", noise_threshold)?;
        correct_with_threshold(state, noise_threshold)
    }

    /// Executes `circuit` on the backend and corrects the result.
    ///
    /// Backend failures and non-normalized backend output are reported as
    /// `Backend` errors; only the corrected vector may be unnormalized.
    pub fn apply_error_correction(&self, circuit: &Circuit) -> Result<StateVector> {
        let state = checked_statevector(&self.backend, circuit, "apply_error_correction", self.normalization_tolerance)?;
        self.correct_state(&state)
    }

    /// Stores a corrected state under `key`, overwriting any previous one.
    pub fn store_corrected_state(&self, key: impl Into<String>, state: StateVector) {
        self.corrected.store(key, state);
    }

    /// Looks up a corrected state.
    pub fn retrieve_corrected_state(&self, key: &str) -> Option<StateVector> {
        self.corrected.retrieve(key)
    }

    /// Keys of stored corrected states, in insertion order.
    pub fn corrected_keys(&self) -> Vec<String> {
        self.corrected.list_keys()
    }

    /// Drops every stored corrected state.
    pub fn clear_corrected_states(&self) {
        self.corrected.clear();
    }
}

fn correct_with_threshold(state: &StateVector, noise_threshold: f64) -> Result<StateVector> {
    let mut zeroed = 0usize;
    let amplitudes: Vec<Complex<f64>> = state
        .amplitudes()
        .iter()
        .map(|c| {
            if c.norm() > noise_threshold {
                *c
            } else {
                if !c.is_zero() {
                    zeroed += 1;
                }
                Complex::zero()
            }
        })
        .collect();
    debug!(zeroed, noise_threshold, "corrected state");
    StateVector::new(amplitudes)
}
