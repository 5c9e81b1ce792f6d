// src/validation/mod.rs

//! Checks applied where a [`StateVector`] must satisfy the normalization
//! invariant: verifier references, anchored states and loaded states.

use crate::circuits::Circuit;
use crate::core::constants::anchor_constants::DEFAULT_NORM_TOLERANCE;
use crate::core::{QanchorError, Result, StateVector};
use crate::simulation::ExecutionBackend;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `1e-6`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QanchorError::InvalidState)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq = state.norm_sqr();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(QanchorError::invalid_state(format!(
            "state vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )))
    } else {
        Ok(())
    }
}

/// Checks that two states share a dimension.
pub fn check_same_dimension(expected: &StateVector, actual: &StateVector) -> Result<()> {
    if expected.dim() == actual.dim() {
        Ok(())
    } else {
        Err(QanchorError::DimensionMismatch {
            expected: expected.dim(),
            actual: actual.dim(),
        })
    }
}

/// Normalization check for states returned by an execution backend; a
/// violation is reported as a backend failure of `operation`.
pub fn check_backend_output(state: &StateVector, operation: &str, tolerance: f64) -> Result<()> {
    check_normalization(state, Some(tolerance))
        .map_err(|e| QanchorError::backend(operation, format!("backend returned malformed output: {}", e)))
}

/// Runs `circuit` on `backend` for `operation`. Any failure, including a
/// non-normalized result, is reported as [`QanchorError::Backend`].
pub(crate) fn checked_statevector<B>(backend: &B, circuit: &Circuit, operation: &str, tolerance: f64) -> Result<StateVector>
where
    B: ExecutionBackend + ?Sized,
{
    let state = backend.statevector(circuit).map_err(|e| match e {
        QanchorError::Backend { .. } => e,
        other => QanchorError::backend(operation, other.to_string()),
    })?;
    check_backend_output(&state, operation, tolerance)?;
    Ok(state)
}
