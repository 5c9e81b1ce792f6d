// src/verification/mod.rs

//! Fidelity checks against a fixed reference state.

use crate::config::{validate_threshold, Config};
use crate::core::constants::anchor_constants::DEFAULT_FIDELITY_THRESHOLD;
use crate::core::{Result, StateVector};
use crate::validation::{check_normalization, check_same_dimension};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Outcome of [`StateVerifier::verify`]. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerificationResult {
    /// `|⟨reference|candidate⟩|²`.
    pub fidelity: f64,
    /// `fidelity > 1 - threshold`.
    pub passed: bool,
    /// Amplitude-difference estimate, see [`StateVerifier::estimate_error`].
    pub error: Option<f64>,
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fidelity={:.6} {}",
            self.fidelity,
            if self.passed { "PASS" } else { "FAIL" }
        )?;
        if let Some(error) = self.error {
            write!(f, " error={:.6}", error)?;
        }
        Ok(())
    }
}

/// Compares candidate states with one immutable reference.
#[derive(Debug, Clone)]
pub struct StateVerifier {
    reference: StateVector,
    threshold: f64,
}

impl StateVerifier {
    /// Creates a verifier.
    ///
    /// # Errors
    /// * `InvalidState` if `reference` is not normalized.
    /// * `InvalidConfig` if `threshold` is outside `[0, 1)`.
    pub fn new(reference: StateVector, threshold: f64) -> Result<Self> {
        check_normalization(&reference, None)?;
        validate_threshold("threshold", threshold)?;
        Ok(Self { reference, threshold })
    }

    /// Verifier with the default threshold of `1e-5`.
    pub fn with_default_threshold(reference: StateVector) -> Result<Self> {
        Self::new(reference, DEFAULT_FIDELITY_THRESHOLD)
    }

    /// Verifier using `config.verification_threshold` and
    /// `config.normalization_tolerance`.
    pub fn with_config(reference: StateVector, config: &Config) -> Result<Self> {
        check_normalization(&reference, Some(config.normalization_tolerance))?;
        validate_threshold("verification_threshold", config.verification_threshold)?;
        Ok(Self {
            reference,
            threshold: config.verification_threshold,
        })
    }

    pub fn reference(&self) -> &StateVector {
        &self.reference
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `|⟨reference|candidate⟩|²`. Fails on a dimension mismatch.
    pub fn calculate_fidelity(&self, candidate: &StateVector) -> Result<f64> {
        self.reference.fidelity(candidate)
    }

    /// `true` if the fidelity exceeds `1 - threshold`.
    pub fn verify_state(&self, candidate: &StateVector) -> Result<bool> {
        Ok(self.calculate_fidelity(candidate)? > 1.0 - self.threshold)
    }

    /// Returns `(changed, fidelity)` where `changed` means the fidelity fell
    /// below `1 - threshold`.
    pub fn detect_state_change(&self, candidate: &StateVector) -> Result<(bool, f64)> {
        let fidelity = self.calculate_fidelity(candidate)?;
        let changed = fidelity < 1.0 - self.threshold;
        debug!(fidelity, changed, "state change check");
        Ok((changed, fidelity))
    }

    /// Euclidean norm of the element-wise amplitude difference.
    ///
    /// This is a coarse distance proxy and is sensitive to global phase,
    /// unlike the fidelity.
    pub fn estimate_error(&self, candidate: &StateVector) -> Result<f64> {
        self.reference.distance(candidate)
    }

    /// Fidelity, pass/fail and error estimate in one call.
    pub fn verify(&self, candidate: &StateVector) -> Result<VerificationResult> {
        check_same_dimension(&self.reference, candidate)?;
        let fidelity = self.calculate_fidelity(candidate)?;
        let error = self.estimate_error(candidate)?;
        Ok(VerificationResult {
            fidelity,
            passed: fidelity > 1.0 - self.threshold,
            error: Some(error),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QanchorError;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn plus() -> StateVector {
        StateVector::from_pairs(&[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]).unwrap()
    }

    #[test]
    fn test_identical_state_passes() {
        let verifier = StateVerifier::with_default_threshold(plus()).unwrap();
        assert!(verifier.verify_state(&plus()).unwrap());
        let (changed, fidelity) = verifier.detect_state_change(&plus()).unwrap();
        assert!(!changed);
        assert!((fidelity - 1.0).abs() < 1e-12);
        assert!(verifier.estimate_error(&plus()).unwrap() < 1e-12);
    }

    #[test]
    fn test_orthogonal_state_is_flagged() {
        let zero = StateVector::zero_state(1).unwrap();
        let verifier = StateVerifier::new(zero, 1e-5).unwrap();
        let one = StateVector::basis_state(1, 1).unwrap();
        let result = verifier.verify(&one).unwrap();
        assert!(!result.passed);
        assert_eq!(result.fidelity, 0.0);
        assert!((result.error.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(verifier.detect_state_change(&one).unwrap(), (true, 0.0));
    }

    #[test]
    fn test_rejects_bad_construction() {
        let short = StateVector::from_pairs(&[(0.5, 0.0), (0.0, 0.0)]).unwrap();
        assert!(matches!(StateVerifier::new(short, 1e-5), Err(QanchorError::InvalidState { .. })));
        assert!(matches!(StateVerifier::new(plus(), 1.0), Err(QanchorError::InvalidConfig { .. })));
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let verifier = StateVerifier::with_default_threshold(plus()).unwrap();
        let two_qubit = StateVector::zero_state(2).unwrap();
        assert!(matches!(verifier.verify(&two_qubit), Err(QanchorError::DimensionMismatch { .. })));
    }
}
