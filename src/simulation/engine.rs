// src/simulation/engine.rs
use crate::core::{QanchorError, QubitId, Result, StateVector};
use crate::operations::{Matrix2, Operation};
use num_complex::Complex;
use num_traits::Zero; // For Complex::zero()

/// Evolves a dense amplitude vector through a circuit's operations.
/// (Internal visibility)
///
/// Basis indices are little-endian: qubit `q` is bit `q` of the index.
#[derive(Debug)]
pub(crate) struct SimulationEngine {
    /// Amplitudes of dimension `2^num_qubits`.
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine in `|0...0>`.
    pub(crate) fn init(num_qubits: usize, max_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QanchorError::backend("simulate", "cannot simulate a circuit with zero qubits"));
        }
        if num_qubits > max_qubits {
            return Err(QanchorError::backend(
                "simulate",
                format!("{} qubits exceeds the simulator limit of {}", num_qubits, max_qubits),
            ));
        }
        let dim = 1usize.checked_shl(num_qubits as u32).ok_or_else(|| {
            QanchorError::backend("simulate", "number of qubits overflows the state dimension")
        })?;

        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Ok(Self { amplitudes, num_qubits })
    }

    // Add a crate-visible method to set the state directly for testing
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: &StateVector) -> Result<()> {
        if state.dim() != self.amplitudes.len() {
            return Err(QanchorError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: state.dim(),
            });
        }
        self.amplitudes = state.amplitudes().to_vec();
        Ok(())
    }

    /// Applies a single operation. `Measure` is a terminal readout and leaves
    /// the amplitudes untouched.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Gate { target, gate } => {
                let target_idx = self.qubit_index(target)?;
                self.apply_single_qubit_gate(target_idx, &gate.matrix());
            }
            Operation::Controlled { control, target, gate } => {
                let control_idx = self.qubit_index(control)?;
                let target_idx = self.qubit_index(target)?;
                if control_idx == target_idx {
                    return Err(QanchorError::backend(
                        op.name(),
                        "control and target qubits cannot be the same",
                    ));
                }
                self.apply_controlled_gate(control_idx, target_idx, &gate.matrix());
            }
            Operation::PhaseShift { target, theta } => {
                let target_idx = self.qubit_index(target)?;
                check_angle(op, *theta)?;
                self.apply_single_qubit_gate(target_idx, &phase_shift_matrix(*theta));
            }
            Operation::Rotation { target, axis, theta } => {
                let target_idx = self.qubit_index(target)?;
                check_angle(op, *theta)?;
                self.apply_single_qubit_gate(target_idx, &axis.rotation_matrix(*theta));
            }
            Operation::Measure { targets } => {
                for target in targets {
                    self.qubit_index(target)?;
                }
            }
        };
        Ok(())
    }

    /// Consumes the engine and returns the final state.
    pub(crate) fn into_state(self) -> Result<StateVector> {
        StateVector::new(self.amplitudes)
            .map_err(|e| QanchorError::backend("simulate", format!("produced malformed state: {}", e)))
    }

    /// Helper to get a qubit index, returning a specific error if not found.
    fn qubit_index(&self, qubit: &QubitId) -> Result<usize> {
        if qubit.0 < self.num_qubits {
            Ok(qubit.0)
        } else {
            Err(QanchorError::backend(
                "simulate",
                format!("{} is outside a {}-qubit register", qubit, self.num_qubits),
            ))
        }
    }

    /// Applies a 2x2 matrix to one qubit of the global state vector.
    fn apply_single_qubit_gate(&mut self, target_idx: usize, matrix: &Matrix2) {
        let mask = 1usize << target_idx;
        // Iterate over pairs of basis states differing only at the target bit
        for i0 in 0..self.amplitudes.len() {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let psi_0 = self.amplitudes[i0];
            let psi_1 = self.amplitudes[i1];
            self.amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            self.amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Applies `matrix` to the target qubit on the subspace where the control bit is 1.
    fn apply_controlled_gate(&mut self, control_idx: usize, target_idx: usize, matrix: &Matrix2) {
        let c_mask = 1usize << control_idx;
        let t_mask = 1usize << target_idx;
        for i0 in 0..self.amplitudes.len() {
            if i0 & c_mask == 0 || i0 & t_mask != 0 {
                continue;
            }
            let i1 = i0 | t_mask;
            let psi_0 = self.amplitudes[i0];
            let psi_1 = self.amplitudes[i1];
            self.amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            self.amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }
}

fn check_angle(op: &Operation, theta: f64) -> Result<()> {
    if theta.is_finite() {
        Ok(())
    } else {
        Err(QanchorError::backend(op.name(), format!("angle {} is not finite", theta)))
    }
}

/// 2x2 matrix applying `e^(i*theta)` to the `|1>` component.
fn phase_shift_matrix(theta: f64) -> Matrix2 {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(theta.cos(), theta.sin())], // e^(i*theta)
    ]
}
