//! Property-based tests for qanchor using proptest
//!
//! Tests fidelity, correction and persistence properties that must hold
//! regardless of the specific amplitudes involved.

use chrono::{DateTime, TimeZone, Utc};
use num_complex::Complex;
use proptest::prelude::*;
use qanchor::anchoring::{decode_anchor, encode_anchor};
use qanchor::{AnchorRecord, ErrorCorrector, StateVector};

/// Random normalized state on 1 to 3 qubits.
fn normalized_state(num_qubits: usize) -> impl Strategy<Value = StateVector> {
    prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 1usize << num_qubits)
        .prop_filter("non-zero vector", |pairs| {
            pairs.iter().map(|(re, im)| re * re + im * im).sum::<f64>() > 1e-6
        })
        .prop_map(|pairs| {
            let norm = pairs.iter().map(|(re, im)| re * re + im * im).sum::<f64>().sqrt();
            let amplitudes = pairs.into_iter().map(|(re, im)| Complex::new(re / norm, im / norm)).collect();
            StateVector::new(amplitudes).unwrap()
        })
}

fn state_pair() -> impl Strategy<Value = (StateVector, StateVector)> {
    (1usize..=3).prop_flat_map(|n| (normalized_state(n), normalized_state(n)))
}

fn anchor_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

// ============================================================================
// Fidelity Properties
// ============================================================================

proptest! {
    /// Property: a state has fidelity 1 with itself
    #[test]
    fn fidelity_identity(state in (1usize..=3).prop_flat_map(normalized_state)) {
        let f = state.fidelity(&state).unwrap();
        prop_assert!((f - 1.0).abs() < 1e-9, "fidelity = {}", f);
    }

    /// Property: fidelity is symmetric
    #[test]
    fn fidelity_symmetric((a, b) in state_pair()) {
        let ab = a.fidelity(&b).unwrap();
        let ba = b.fidelity(&a).unwrap();
        prop_assert!((ab - ba).abs() < 1e-12);
    }

    /// Property: fidelity lies in [0, 1]
    #[test]
    fn fidelity_bounded((a, b) in state_pair()) {
        let f = a.fidelity(&b).unwrap();
        prop_assert!(f >= 0.0);
        prop_assert!(f <= 1.0 + 1e-9, "fidelity = {}", f);
    }
}

// ============================================================================
// Correction Properties
// ============================================================================

proptest! {
    /// Property: each amplitude is kept exactly or zeroed, by magnitude
    #[test]
    fn correction_is_hard_threshold(
        state in (1usize..=3).prop_flat_map(normalized_state),
        threshold in 0.0f64..0.9
    ) {
        let corrector = ErrorCorrector::new();
        let corrected = corrector.correct_state_with_threshold(&state, threshold).unwrap();
        prop_assert_eq!(corrected.dim(), state.dim());
        for (before, after) in state.amplitudes().iter().zip(corrected.amplitudes()) {
            if before.norm() > threshold {
                prop_assert_eq!(after, before);
            } else {
                prop_assert_eq!(*after, Complex::new(0.0, 0.0));
            }
        }
        prop_assert!(corrected.norm_sqr() <= state.norm_sqr() + 1e-12);
    }
}

// ============================================================================
// Persistence Properties
// ============================================================================

proptest! {
    /// Property: encoding then decoding an anchor is exact
    #[test]
    fn anchor_text_round_trip(
        state in (1usize..=3).prop_flat_map(normalized_state),
        time in anchor_time()
    ) {
        let record = AnchorRecord { state, anchor_time: time };
        let decoded = decode_anchor(&encode_anchor(&record).unwrap()).unwrap();
        prop_assert_eq!(decoded.anchor_time, record.anchor_time);
        prop_assert_eq!(&decoded.state, &record.state);
        prop_assert!((decoded.state.fidelity(&record.state).unwrap() - 1.0).abs() < 1e-9);
    }
}
