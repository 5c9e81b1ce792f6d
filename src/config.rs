// src/config.rs

//! Runtime configuration.
//!
//! [`Config`] gathers the thresholds used by the anchoring components and
//! the simulator settings. It deserializes from JSON; missing fields take
//! their defaults and unknown fields are rejected.

use crate::core::constants::anchor_constants::{
    DEFAULT_FIDELITY_THRESHOLD, DEFAULT_NOISE_THRESHOLD, DEFAULT_NORM_TOLERANCE,
};
use crate::core::{QanchorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest register the simulator accepts.
pub const MAX_SUPPORTED_QUBITS: usize = 30;

/// Settings for the built-in [`Simulator`](crate::simulation::Simulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Shots used by `Simulator::run`.
    pub shots: u64,
    /// Sampling seed. When `None` the seed is derived from the final amplitudes,
    /// which keeps sampling deterministic per circuit.
    pub seed: Option<u64>,
    /// Register width above which circuits are rejected.
    pub max_qubits: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            shots: 1024,
            seed: None,
            max_qubits: 20,
        }
    }
}

impl SimulatorConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.shots == 0 {
            return Err(QanchorError::invalid_config("simulator.shots", "must be at least 1"));
        }
        if self.max_qubits == 0 || self.max_qubits > MAX_SUPPORTED_QUBITS {
            return Err(QanchorError::invalid_config(
                "simulator.max_qubits",
                format!("must be between 1 and {}", MAX_SUPPORTED_QUBITS),
            ));
        }
        Ok(())
    }
}

/// Thresholds and simulator settings for the whole crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fidelity slack used by `AnchorManager::compare_states`.
    pub compare_threshold: f64,
    /// Fidelity slack used by `StateVerifier`.
    pub verification_threshold: f64,
    /// Amplitude magnitude at or below which the corrector zeroes a component.
    pub noise_threshold: f64,
    /// Allowed deviation of `Σ|c_i|²` from 1 for reference and anchored states.
    pub normalization_tolerance: f64,
    /// Simulator settings.
    pub simulator: SimulatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compare_threshold: DEFAULT_FIDELITY_THRESHOLD,
            verification_threshold: DEFAULT_FIDELITY_THRESHOLD,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            normalization_tolerance: DEFAULT_NORM_TOLERANCE,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Config {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| QanchorError::invalid_config("<json>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| QanchorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_threshold("compare_threshold", self.compare_threshold)?;
        validate_threshold("verification_threshold", self.verification_threshold)?;
        validate_threshold("noise_threshold", self.noise_threshold)?;
        if !(self.normalization_tolerance.is_finite() && self.normalization_tolerance > 0.0) {
            return Err(QanchorError::invalid_config(
                "normalization_tolerance",
                "must be positive and finite",
            ));
        }
        self.simulator.validate()
    }
}

/// Thresholds live in `[0, 1)`.
pub(crate) fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(QanchorError::invalid_config(name, format!("{} is outside [0, 1)", value)))
    }
}
