// src/core/state.rs

use super::error::{QanchorError, Result};
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable vector of complex amplitudes of dimension `2^n`.
///
/// Produced by an [`ExecutionBackend`](crate::simulation::ExecutionBackend);
/// every transformation returns a new `StateVector`. Construction checks the
/// dimension and finiteness but not normalization: the error corrector is
/// allowed to emit vectors with total probability below one. Components that
/// hold a *reference* or *anchored* state enforce normalization through
/// [`check_normalization`](crate::validation::check_normalization).
///
/// Serialized as a list of `[re, im]` pairs, which is the structured vector
/// format of the anchor persistence file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] // Avoid Eq for floating-point complex numbers
#[serde(try_from = "Vec<Complex<f64>>", into = "Vec<Complex<f64>>")]
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// Creates a state vector from raw amplitudes.
    ///
    /// # Errors
    /// `InvalidState` if the length is not a power of two or an amplitude is
    /// not finite.
    pub fn new(amplitudes: Vec<Complex<f64>>) -> Result<Self> {
        if amplitudes.is_empty() || !amplitudes.len().is_power_of_two() {
            return Err(QanchorError::invalid_state(format!(
                "amplitude count {} is not a power of two",
                amplitudes.len()
            )));
        }
        if let Some(index) = amplitudes.iter().position(|c| !c.re.is_finite() || !c.im.is_finite()) {
            return Err(QanchorError::invalid_state(format!(
                "amplitude {} is not finite: {}",
                index, amplitudes[index]
            )));
        }
        Ok(Self { amplitudes })
    }

    /// Builds a state from `(re, im)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(re, im)| Complex::new(re, im)).collect())
    }

    /// The all-zeros basis state `|0...0>` on `num_qubits` qubits.
    pub fn zero_state(num_qubits: usize) -> Result<Self> {
        Self::basis_state(num_qubits, 0)
    }

    /// The computational basis state `|index>` on `num_qubits` qubits.
    pub fn basis_state(num_qubits: usize, index: usize) -> Result<Self> {
        let dim = 1usize.checked_shl(num_qubits as u32).filter(|d| *d > 0).ok_or_else(|| {
            QanchorError::invalid_state(format!("{} qubits overflow the state dimension", num_qubits))
        })?;
        if index >= dim {
            return Err(QanchorError::invalid_state(format!(
                "basis index {} out of range for dimension {}",
                index, dim
            )));
        }
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[index] = Complex::new(1.0, 0.0);
        Ok(Self { amplitudes })
    }

    /// Read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Dimension `2^n` of the vector.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Number of qubits `n`.
    pub fn num_qubits(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }

    /// Total probability `Σ|c_i|²`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Per-basis-state probabilities `|c_i|²`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Inner product `⟨self|other⟩`.
    pub fn inner_product(&self, other: &StateVector) -> Result<Complex<f64>> {
        self.ensure_same_dim(other)?;
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Fidelity `|⟨self|other⟩|²`.
    ///
    /// Phase-sensitive: no global phase alignment is performed.
    pub fn fidelity(&self, other: &StateVector) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Euclidean norm of the element-wise absolute amplitude difference.
    ///
    /// A coarse distance proxy, not a trace distance.
    pub fn distance(&self, other: &StateVector) -> Result<f64> {
        self.ensure_same_dim(other)?;
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| (a - b).norm_sqr())
            .sum::<f64>()
            .sqrt())
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &StateVector, tolerance: f64) -> bool {
        self.dim() == other.dim()
            && self
                .amplitudes
                .iter()
                .zip(other.amplitudes.iter())
                .all(|(a, b)| (a - b).norm_sqr() <= tolerance * tolerance)
    }

    fn ensure_same_dim(&self, other: &StateVector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(QanchorError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Complex<f64>>> for StateVector {
    type Error = QanchorError;

    fn try_from(amplitudes: Vec<Complex<f64>>) -> Result<Self> {
        Self::new(amplitudes)
    }
}

impl From<StateVector> for Vec<Complex<f64>> {
    fn from(state: StateVector) -> Self {
        state.amplitudes
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateVector[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn plus() -> StateVector {
        StateVector::from_pairs(&[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]).unwrap()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let err = StateVector::from_pairs(&[(1.0, 0.0), (0.0, 0.0), (0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, QanchorError::InvalidState { .. }));
        assert!(StateVector::new(Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = StateVector::from_pairs(&[(f64::NAN, 0.0), (0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, QanchorError::InvalidState { .. }));
    }

    #[test]
    fn test_basis_state_and_qubit_count() {
        let s = StateVector::basis_state(3, 5).unwrap();
        assert_eq!(s.dim(), 8);
        assert_eq!(s.num_qubits(), 3);
        assert_eq!(s.amplitudes()[5], Complex::new(1.0, 0.0));
        assert!(StateVector::basis_state(1, 2).is_err());
    }

    #[test]
    fn test_fidelity_of_orthogonal_states_is_zero() {
        let zero = StateVector::zero_state(1).unwrap();
        let one = StateVector::basis_state(1, 1).unwrap();
        assert_eq!(zero.fidelity(&one).unwrap(), 0.0);
        assert!((zero.fidelity(&plus()).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fidelity_is_phase_sensitive_only_through_relative_phase() {
        // Global phase i leaves |<a|b>|^2 unchanged
        let rotated = StateVector::from_pairs(&[(0.0, FRAC_1_SQRT_2), (0.0, FRAC_1_SQRT_2)]).unwrap();
        assert!((plus().fidelity(&rotated).unwrap() - 1.0).abs() < 1e-12);
        // but the component-wise distance sees it
        assert!(plus().distance(&rotated).unwrap() > 1.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let one_qubit = StateVector::zero_state(1).unwrap();
        let two_qubit = StateVector::zero_state(2).unwrap();
        let err = one_qubit.fidelity(&two_qubit).unwrap_err();
        assert!(matches!(err, QanchorError::DimensionMismatch { expected: 2, actual: 4 }));
    }

    #[test]
    fn test_serializes_as_pairs() {
        let json = serde_json::to_string(&StateVector::basis_state(1, 1).unwrap()).unwrap();
        assert_eq!(json, "[[0.0,0.0],[1.0,0.0]]");
        let back: StateVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateVector::basis_state(1, 1).unwrap());
        assert!(serde_json::from_str::<StateVector>("[[1.0,0.0],[0.0,0.0],[0.0,0.0]]").is_err());
    }
}
