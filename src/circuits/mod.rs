// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`qanchor::operations::Operation`).
//!
//! A [`Circuit`] is the description handed to an execution backend. This
//! module also provides the circuit statistics (depth, width, op counts),
//! a random circuit generator, and, in [`qasm`], the plain-text format.

pub mod qasm;

use crate::core::QubitId;
use crate::operations::{Gate, Operation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered sequence of operations over a fixed number of qubits.
///
/// Qubit indices are not checked when operations are added; the execution
/// backend rejects out-of-range qubits when the circuit is run.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
pub struct Circuit {
    /// Register width. The state vector has dimension `2^num_qubits`.
    num_qubits: usize,

    /// The ordered sequence of operations.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty circuit on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Adds a single operation to the end of the circuit's sequence.
    ///
    /// Measurements are kept canonical: a `Measure` with no targets is
    /// dropped, and one that directly follows another `Measure` is merged
    /// into it.
    pub fn add_operation(&mut self, op: Operation) {
        if let Operation::Measure { targets } = &op {
            if targets.is_empty() {
                return;
            }
            if let Some(Operation::Measure { targets: last }) = self.operations.last_mut() {
                last.extend(targets.iter().copied());
                return;
            }
        }
        self.operations.push(op);
    }

    /// Adds multiple operations from an iterator to the end of the circuit's sequence.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Classical bits needed to hold measurement results.
    /// A circuit with any `Measure` gets one classical bit per qubit.
    pub fn num_clbits(&self) -> usize {
        if self.has_measurements() { self.num_qubits } else { 0 }
    }

    /// Returns a slice containing the ordered sequence of operations in this circuit.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the total number of operations defined in the circuit.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// `true` if any operation is a `Measure`.
    pub fn has_measurements(&self) -> bool {
        self.operations.iter().any(|op| matches!(op, Operation::Measure { .. }))
    }

    /// Qubits read out by `Measure` operations, sorted and deduplicated.
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        let mut measured: Vec<QubitId> = self
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Measure { targets } => Some(targets.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        measured.sort();
        measured.dedup();
        measured
    }

    /// Length of the longest path of operations sharing a qubit.
    pub fn depth(&self) -> usize {
        let mut layers = vec![0usize; self.num_qubits];
        for op in &self.operations {
            let involved: Vec<usize> = op
                .involved_qubits()
                .into_iter()
                .map(|q| q.0)
                .filter(|q| *q < self.num_qubits)
                .collect();
            let level = involved.iter().map(|q| layers[*q]).max().unwrap_or(0) + 1;
            for q in involved {
                layers[q] = level;
            }
        }
        layers.into_iter().max().unwrap_or(0)
    }

    /// Total number of quantum and classical bits.
    pub fn width(&self) -> usize {
        self.num_qubits.saturating_add(self.num_clbits())
    }

    /// Operation counts keyed by text-format name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.operations {
            *counts.entry(op.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Depth, width and op counts in one value.
    pub fn stats(&self) -> CircuitStats {
        CircuitStats {
            depth: self.depth(),
            width: self.width(),
            ops: self.count_ops(),
        }
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a builder for a circuit on `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
        }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations from an iterator to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Adds a fixed gate on `target`.
    pub fn gate(self, target: usize, gate: Gate) -> Self {
        self.add_op(Operation::gate(target, gate))
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

/// Structural summary of a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitStats {
    /// See [`Circuit::depth`].
    pub depth: usize,
    /// See [`Circuit::width`].
    pub width: usize,
    /// See [`Circuit::count_ops`].
    pub ops: BTreeMap<String, usize>,
}

impl fmt::Display for CircuitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Circuit Depth: {}", self.depth)?;
        writeln!(f, "Circuit Width: {}", self.width)?;
        write!(f, "Circuit Operations: {{")?;
        for (i, (name, count)) in self.ops.iter().enumerate() {
            write!(f, "{}{}: {}", if i > 0 { ", " } else { "" }, name, count)?;
        }
        write!(f, "}}")
    }
}

/// Builds a circuit of `depth` layers where every qubit receives one gate
/// drawn uniformly from `X`, `H` and `Z`.
pub fn random_circuit<R: Rng + ?Sized>(num_qubits: usize, depth: usize, rng: &mut R) -> Circuit {
    const CHOICES: [Gate; 3] = [Gate::X, Gate::H, Gate::Z];
    let mut circuit = Circuit::new(num_qubits);
    for _ in 0..depth {
        for qubit in 0..num_qubits {
            let pick = ((rng.random::<f64>() * CHOICES.len() as f64) as usize).min(CHOICES.len() - 1);
            circuit.add_operation(Operation::gate(qubit, CHOICES[pick]));
        }
    }
    circuit
}

/// [`random_circuit`] driven by a seeded generator, for reproducible circuits.
pub fn random_circuit_seeded(num_qubits: usize, depth: usize, seed: u64) -> Circuit {
    let mut rng = StdRng::seed_from_u64(seed);
    random_circuit(num_qubits, depth, &mut rng)
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new(1)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "qanchor::Circuit[0 operations on {} qubits]", self.num_qubits);
        }

        let ops = &self.operations;
        let num_ops = ops.len();
        let num_rows = self.num_qubits;

        let max_label_width = (0..num_rows).map(|q| QubitId(q).to_string().len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2); // Label + ": "

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        // v_connect[row][time] holds the connector drawn below this row
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre_dashes), symbol, H_WIRE.to_string().repeat(post_dashes))
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Gate { target, gate } => {
                    if *gate == Gate::I {
                        continue; // leave the wire
                    }
                    if let Some(row) = op_grid.get_mut(target.0) {
                        row[t] = format_gate(gate.symbol());
                    }
                }
                Operation::PhaseShift { target, .. } => {
                    if let Some(row) = op_grid.get_mut(target.0) {
                        row[t] = format_gate("P");
                    }
                }
                Operation::Rotation { target, axis, .. } => {
                    if let Some(row) = op_grid.get_mut(target.0) {
                        row[t] = format_gate(&axis.gate_name().to_uppercase());
                    }
                }
                Operation::Controlled { control, target, gate } => {
                    let (r_ctrl, r_tgt) = (control.0, target.0);
                    if r_ctrl < num_rows && r_tgt < num_rows {
                        op_grid[r_ctrl][t] = format_gate("@");
                        op_grid[r_tgt][t] = format_gate(gate.symbol());
                        let r_min = r_ctrl.min(r_tgt);
                        let r_max = r_ctrl.max(r_tgt);
                        for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                }
                Operation::Measure { targets } => {
                    for target in targets {
                        if let Some(row) = op_grid.get_mut(target.0) {
                            row[t] = format_gate("M");
                        }
                    }
                }
            }
        }

        writeln!(f, "qanchor::Circuit[{} operations on {} qubits]", num_ops, num_rows)?;
        for r in 0..num_rows {
            let label = format!("{}: ", QubitId(r));
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r + 1 < num_rows {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_tracks_shared_qubits() {
        let circuit = CircuitBuilder::new(3)
            .gate(0, Gate::H)
            .gate(1, Gate::H)
            .add_op(Operation::Controlled { control: QubitId(0), target: QubitId(1), gate: Gate::X })
            .gate(2, Gate::X)
            .build();
        // H layer, then CX on (0,1); X on 2 runs in parallel with the H layer
        assert_eq!(circuit.depth(), 2);
        assert_eq!(Circuit::new(2).depth(), 0);
    }

    #[test]
    fn test_width_counts_classical_bits() {
        let mut circuit = CircuitBuilder::new(2).gate(0, Gate::H).build();
        assert_eq!(circuit.width(), 2);
        circuit.add_operation(Operation::Measure { targets: vec![QubitId(0)] });
        assert_eq!(circuit.width(), 4);
        assert_eq!(circuit.measured_qubits(), vec![QubitId(0)]);
    }

    #[test]
    fn test_adjacent_measures_merge_and_empty_measure_is_dropped() {
        let circuit = CircuitBuilder::new(2)
            .add_op(Operation::Measure { targets: vec![] })
            .add_op(Operation::Measure { targets: vec![QubitId(0)] })
            .add_op(Operation::Measure { targets: vec![QubitId(1)] })
            .gate(0, Gate::X)
            .add_op(Operation::Measure { targets: vec![QubitId(0)] })
            .build();
        assert_eq!(
            circuit.operations(),
            &[
                Operation::Measure { targets: vec![QubitId(0), QubitId(1)] },
                Operation::gate(0, Gate::X),
                Operation::Measure { targets: vec![QubitId(0)] },
            ]
        );
    }

    #[test]
    fn test_count_ops_and_stats_display() {
        let circuit = CircuitBuilder::new(1)
            .gate(0, Gate::H)
            .gate(0, Gate::H)
            .add_op(Operation::rx(0, 0.5))
            .build();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("h"), Some(&2));
        assert_eq!(counts.get("rx"), Some(&1));
        let text = circuit.stats().to_string();
        assert!(text.contains("Circuit Depth: 3"));
        assert!(text.contains("h: 2"));
    }

    #[test]
    fn test_random_circuit_is_reproducible() {
        let a = random_circuit_seeded(3, 4, 7);
        let b = random_circuit_seeded(3, 4, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        for op in a.operations() {
            match op {
                Operation::Gate { gate, .. } => assert!(matches!(gate, Gate::X | Gate::H | Gate::Z)),
                other => panic!("unexpected operation {:?}", other),
            }
        }
    }

    #[test]
    fn test_display_draws_rows() {
        let circuit = CircuitBuilder::new(2)
            .gate(0, Gate::H)
            .add_op(Operation::Controlled { control: QubitId(0), target: QubitId(1), gate: Gate::X })
            .build();
        let text = circuit.to_string();
        assert!(text.contains("q[0]: "));
        assert!(text.contains("───H───"));
        assert!(text.contains('│'));
    }
}
