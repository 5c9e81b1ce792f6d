// tests/correction_tests.rs

use num_complex::Complex;
use qanchor::operations::Axis;
use qanchor::{CircuitBuilder, Config, ErrorCorrector, Operation, QanchorError, QubitId, Simulator, StateVector};

#[test]
fn test_correct_state_reduces_noise() -> Result<(), QanchorError> {
    let noisy = StateVector::from_pairs(&[(0.70, 0.0), (0.0005, 0.0), (0.0, 0.0002), (0.714, 0.0)])?;
    let corrector = ErrorCorrector::new();
    let corrected = corrector.correct_state(&noisy)?;

    assert_eq!(corrected.dim(), noisy.dim());
    assert_eq!(corrected.amplitudes()[0], Complex::new(0.70, 0.0));
    assert_eq!(corrected.amplitudes()[1], Complex::new(0.0, 0.0));
    assert_eq!(corrected.amplitudes()[2], Complex::new(0.0, 0.0));
    assert_eq!(corrected.amplitudes()[3], Complex::new(0.714, 0.0));
    // Not renormalized
    assert!(corrected.norm_sqr() < noisy.norm_sqr());
    Ok(())
}

#[test]
fn test_apply_error_correction_runs_the_circuit() -> Result<(), QanchorError> {
    // A tiny rotation leaves a small |1> amplitude that the corrector removes
    let circuit = CircuitBuilder::new(1)
        .add_op(Operation::Rotation { target: QubitId(0), axis: Axis::Y, theta: 1e-4 })
        .build();
    let corrector = ErrorCorrector::with_backend(Simulator::new());
    let corrected = corrector.apply_error_correction(&circuit)?;
    assert_eq!(corrected.amplitudes()[1], Complex::new(0.0, 0.0));
    assert!(corrected.amplitudes()[0].norm() > 0.99);
    Ok(())
}

#[test]
fn test_configured_threshold() -> Result<(), QanchorError> {
    let config = Config::from_json_str(r#"{"noise_threshold": 0.5}"#)?;
    let corrector = ErrorCorrector::with_config(Simulator::new(), &config)?;
    assert_eq!(corrector.noise_threshold(), 0.5);

    let state = StateVector::from_pairs(&[(0.8, 0.0), (0.0, 0.6)])?;
    let corrected = corrector.correct_state(&state)?;
    assert_eq!(corrected.amplitudes()[0], Complex::new(0.8, 0.0));
    assert_eq!(corrected.amplitudes()[1], Complex::new(0.0, 0.6));
    Ok(())
}

#[test]
fn test_corrected_state_store() -> Result<(), QanchorError> {
    let corrector = ErrorCorrector::new();
    let state = corrector.correct_state(&StateVector::zero_state(2)?)?;

    corrector.store_corrected_state("run-1", state.clone());
    corrector.store_corrected_state("run-2", state.clone());
    assert_eq!(corrector.retrieve_corrected_state("run-1"), Some(state));
    assert_eq!(corrector.corrected_keys(), vec!["run-1", "run-2"]);

    corrector.clear_corrected_states();
    assert!(corrector.retrieve_corrected_state("run-1").is_none());
    assert!(corrector.corrected_keys().is_empty());
    Ok(())
}

#[test]
fn test_corrected_stores_are_independent() -> Result<(), QanchorError> {
    let a = ErrorCorrector::new();
    let b = ErrorCorrector::new();
    a.store_corrected_state("shared-key", StateVector::zero_state(1)?);
    assert!(b.retrieve_corrected_state("shared-key").is_none());
    Ok(())
}
