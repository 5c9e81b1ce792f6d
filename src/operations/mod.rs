// src/operations/mod.rs

//! Gate-level instructions that make up a [`Circuit`](crate::circuits::Circuit).
//!
//! Each [`Operation`] acts on the amplitude vector held by the simulation
//! engine. Fixed single-qubit gates are described by [`Gate`], parametric
//! rotations by [`Axis`] plus an angle.

use crate::core::QubitId;
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// 2x2 complex matrix acting on one qubit.
pub type Matrix2 = [[Complex<f64>; 2]; 2];

/// Fixed single-qubit gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Identity.
    I,
    /// Bit flip.
    X,
    /// Combined bit and phase flip.
    Y,
    /// Phase flip.
    Z,
    /// Hadamard: equal superposition from a basis state.
    H,
    /// Phase `π/2`.
    S,
    /// Phase `-π/2`.
    Sdg,
    /// Phase `π/4`.
    T,
    /// Phase `-π/4`.
    Tdg,
    /// Square root of X.
    SX,
}

impl Gate {
    /// Every fixed gate, in a stable order.
    pub const ALL: [Gate; 10] = [
        Gate::I,
        Gate::X,
        Gate::Y,
        Gate::Z,
        Gate::H,
        Gate::S,
        Gate::Sdg,
        Gate::T,
        Gate::Tdg,
        Gate::SX,
    ];

    /// Lower-case name used by the circuit text format.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::SX => "sx",
        }
    }

    /// Looks a gate up by its text-format name.
    pub fn from_name(name: &str) -> Option<Gate> {
        Gate::ALL.iter().copied().find(|g| g.name() == name)
    }

    /// Symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::I => "I",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::Sdg => "S†",
            Gate::T => "T",
            Gate::Tdg => "T†",
            Gate::SX => "√X",
        }
    }

    /// The gate's unitary in the `{|0>, |1>}` basis.
    pub fn matrix(&self) -> Matrix2 {
        let one = Complex::new(1.0, 0.0);
        let zero = Complex::zero();
        let i = Complex::i();
        match self {
            Gate::I => [[one, zero], [zero, one]],
            Gate::X => [[zero, one], [one, zero]],
            Gate::Y => [[zero, -i], [i, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::H => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::S => [[one, zero], [zero, i]],
            Gate::Sdg => [[one, zero], [zero, -i]],
            Gate::T => [[one, zero], [zero, Complex::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]],
            Gate::Tdg => [[one, zero], [zero, Complex::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)]],
            Gate::SX => [
                [Complex::new(0.5, 0.5), Complex::new(0.5, -0.5)],
                [Complex::new(0.5, -0.5), Complex::new(0.5, 0.5)],
            ],
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Rotation axis on the Bloch sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// `rx`, `ry` or `rz`.
    pub fn gate_name(&self) -> &'static str {
        match self {
            Axis::X => "rx",
            Axis::Y => "ry",
            Axis::Z => "rz",
        }
    }

    /// `R_axis(theta) = exp(-i theta/2 σ_axis)`.
    pub fn rotation_matrix(&self, theta: f64) -> Matrix2 {
        let half = theta / 2.0;
        let (c, s) = (half.cos(), half.sin());
        match self {
            Axis::X => [
                [Complex::new(c, 0.0), Complex::new(0.0, -s)],
                [Complex::new(0.0, -s), Complex::new(c, 0.0)],
            ],
            Axis::Y => [
                [Complex::new(c, 0.0), Complex::new(-s, 0.0)],
                [Complex::new(s, 0.0), Complex::new(c, 0.0)],
            ],
            Axis::Z => [
                [Complex::new(c, -s), Complex::zero()],
                [Complex::zero(), Complex::new(c, s)],
            ],
        }
    }
}

/// One instruction of a circuit.
#[derive(Debug, Clone, PartialEq)] // f64 parameters rule out Eq
pub enum Operation {
    /// Apply a fixed gate to one qubit.
    Gate {
        /// Qubit the gate acts on.
        target: QubitId,
        /// Which gate.
        gate: Gate,
    },

    /// Apply `gate` to `target` when `control` is `|1>`.
    Controlled {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
        /// Gate applied on the target subspace.
        gate: Gate,
    },

    /// Phase factor `e^(iθ)` on the `|1>` component of one qubit.
    PhaseShift {
        /// Qubit whose `|1>` amplitude is rotated.
        target: QubitId,
        /// The phase angle in radians.
        theta: f64,
    },

    /// Rotation by `theta` radians about a Bloch-sphere axis.
    ///
    /// The anchor drift heuristic appends an X rotation of this kind.
    Rotation {
        /// Qubit being rotated.
        target: QubitId,
        /// Rotation axis.
        axis: Axis,
        /// Angle in radians.
        theta: f64,
    },

    /// Terminal readout of the listed qubits.
    ///
    /// Ignored by statevector execution; selects the bits reported by sampling.
    Measure {
        /// Qubits to read out.
        targets: Vec<QubitId>,
    },
}

impl Operation {
    /// Returns every qubit mentioned by the operation.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Gate { target, .. } => vec![*target],
            Operation::Controlled { control, target, .. } => vec![*control, *target],
            Operation::PhaseShift { target, .. } => vec![*target],
            Operation::Rotation { target, .. } => vec![*target],
            Operation::Measure { targets } => targets.clone(),
        }
    }

    /// Name used for op counting and the text format.
    pub fn name(&self) -> String {
        match self {
            Operation::Gate { gate, .. } => gate.name().to_string(),
            Operation::Controlled { gate, .. } => format!("c{}", gate.name()),
            Operation::PhaseShift { .. } => "p".to_string(),
            Operation::Rotation { axis, .. } => axis.gate_name().to_string(),
            Operation::Measure { .. } => "measure".to_string(),
        }
    }

    /// Convenience constructor for a fixed gate.
    pub fn gate(target: usize, gate: Gate) -> Self {
        Operation::Gate { target: QubitId(target), gate }
    }

    /// Convenience constructor for an X rotation.
    pub fn rx(target: usize, theta: f64) -> Self {
        Operation::Rotation { target: QubitId(target), axis: Axis::X, theta }
    }
}
