//! Numeric constants shared across the crate.

/// Defaults and fixed factors used by anchoring components.
pub mod anchor_constants {
    /// Used for rotation and phase angles.
    pub const PI: f64 = std::f64::consts::PI;
    /// Drift rotation per elapsed second, in radians (`π/4`).
    pub const DRIFT_RADIANS_PER_SECOND: f64 = std::f64::consts::FRAC_PI_4;
    /// Default fidelity slack for `compare_states` and the verifier.
    pub const DEFAULT_FIDELITY_THRESHOLD: f64 = 1e-5;
    /// Default magnitude below which the corrector zeroes an amplitude.
    pub const DEFAULT_NOISE_THRESHOLD: f64 = 1e-3;
    /// Default allowed deviation of `Σ|c_i|²` from 1.
    pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-6;
}
