// src/circuits/qasm.rs

//! Plain-text circuit format.
//!
//! A subset of OpenQASM 2.0 covering every [`Operation`]:
//!
//! ```text
//! OPENQASM 2.0;
//! include "qelib1.inc";
//! qreg q[2];
//! creg c[2];
//! h q[0];
//! rx(785.3981633974483) q[0];
//! cx q[0],q[1];
//! measure q[1] -> c[1];
//! ```
//!
//! Angles are written with Rust's shortest round-trip float formatting and
//! [`Circuit`] keeps measurements merged, so `from_qasm(&to_qasm(c))`
//! reproduces `c` exactly for any register of 1 to
//! [`MAX_SUPPORTED_QUBITS`](crate::config::MAX_SUPPORTED_QUBITS) qubits.
//! Larger registers are rejected when parsing.

use super::Circuit;
use crate::config::MAX_SUPPORTED_QUBITS;
use crate::core::{QanchorError, QubitId, Result};
use crate::operations::{Axis, Gate, Operation};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Renders a circuit as text.
pub fn to_qasm(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 2.0;\n");
    out.push_str("include \"qelib1.inc\";\n");
    let _ = writeln!(out, "qreg q[{}];", circuit.num_qubits());
    if circuit.num_clbits() > 0 {
        let _ = writeln!(out, "creg c[{}];", circuit.num_clbits());
    }
    for op in circuit.operations() {
        match op {
            Operation::Gate { target, gate } => {
                let _ = writeln!(out, "{} q[{}];", gate.name(), target.0);
            }
            Operation::Controlled { control, target, gate } => {
                let _ = writeln!(out, "c{} q[{}],q[{}];", gate.name(), control.0, target.0);
            }
            Operation::PhaseShift { target, theta } => {
                let _ = writeln!(out, "p({}) q[{}];", theta, target.0);
            }
            Operation::Rotation { target, axis, theta } => {
                let _ = writeln!(out, "{}({}) q[{}];", axis.gate_name(), theta, target.0);
            }
            Operation::Measure { targets } => {
                for target in targets {
                    let _ = writeln!(out, "measure q[{}] -> c[{}];", target.0, target.0);
                }
            }
        }
    }
    out
}

/// Parses circuit text produced by [`to_qasm`] (or written by hand in the same subset).
///
/// Consecutive `measure` lines become a single `Measure` operation, matching
/// how [`Circuit::add_operation`] stores measurements.
pub fn from_qasm(text: &str) -> Result<Circuit> {
    let mut circuit: Option<Circuit> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = match raw.find("//") {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();

        if line.is_empty() || line.starts_with("OPENQASM") || line.starts_with("include") {
            continue;
        }
        let stmt = line
            .strip_suffix(';')
            .ok_or_else(|| parse_error(line_no, "statement must end with ';'"))?
            .trim();

        if let Some(rest) = stmt.strip_prefix("qreg") {
            if circuit.is_some() {
                return Err(parse_error(line_no, "only one qreg is supported"));
            }
            let size = parse_register(rest.trim(), 'q', line_no)?;
            if size == 0 || size > MAX_SUPPORTED_QUBITS {
                return Err(parse_error(
                    line_no,
                    format!("register size {} is outside 1..={}", size, MAX_SUPPORTED_QUBITS),
                ));
            }
            circuit = Some(Circuit::new(size));
            continue;
        }
        if stmt.starts_with("creg") {
            continue;
        }

        let circ = circuit
            .as_mut()
            .ok_or_else(|| parse_error(line_no, "operation before qreg declaration"))?;

        if let Some(rest) = stmt.strip_prefix("measure") {
            let (qubit_part, _) = rest
                .split_once("->")
                .ok_or_else(|| parse_error(line_no, "measure needs '-> c[i]'"))?;
            let qubit = QubitId(parse_register(qubit_part.trim(), 'q', line_no)?);
            circ.add_operation(Operation::Measure { targets: vec![qubit] });
            continue;
        }

        let (head, args) = stmt
            .split_once(char::is_whitespace)
            .ok_or_else(|| parse_error(line_no, "missing qubit arguments"))?;
        let qubits = args
            .split(',')
            .map(|a| parse_register(a.trim(), 'q', line_no).map(QubitId))
            .collect::<Result<Vec<_>>>()?;

        let op = match head.split_once('(') {
            Some((name, param)) => {
                let theta = parse_angle(param, line_no)?;
                let target = single_qubit(&qubits, line_no)?;
                match name {
                    "p" => Operation::PhaseShift { target, theta },
                    "rx" => Operation::Rotation { target, axis: Axis::X, theta },
                    "ry" => Operation::Rotation { target, axis: Axis::Y, theta },
                    "rz" => Operation::Rotation { target, axis: Axis::Z, theta },
                    other => return Err(parse_error(line_no, format!("unknown parametric gate '{}'", other))),
                }
            }
            None => {
                if let Some(gate) = Gate::from_name(head) {
                    Operation::Gate { target: single_qubit(&qubits, line_no)?, gate }
                } else if let Some(gate) = head.strip_prefix('c').and_then(Gate::from_name) {
                    if qubits.len() != 2 {
                        return Err(parse_error(line_no, format!("'{}' takes two qubits", head)));
                    }
                    Operation::Controlled { control: qubits[0], target: qubits[1], gate }
                } else {
                    return Err(parse_error(line_no, format!("unknown gate '{}'", head)));
                }
            }
        };
        circ.add_operation(op);
    }

    circuit.ok_or_else(|| parse_error(0, "no qreg declaration found"))
}

/// Writes [`to_qasm`] output to `path`.
pub fn save_circuit(circuit: &Circuit, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_qasm(circuit)).map_err(|source| QanchorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), ops = circuit.len(), "saved circuit");
    Ok(())
}

/// Reads a circuit written by [`save_circuit`].
pub fn load_circuit(path: impl AsRef<Path>) -> Result<Circuit> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| QanchorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let circuit = from_qasm(&text)?;
    debug!(path = %path.display(), ops = circuit.len(), "loaded circuit");
    Ok(circuit)
}

fn parse_error(line: usize, message: impl Into<String>) -> QanchorError {
    QanchorError::CircuitParse {
        line,
        message: message.into(),
    }
}

/// Parses `q[3]` (with `reg = 'q'`) into `3`.
fn parse_register(token: &str, reg: char, line: usize) -> Result<usize> {
    token
        .strip_prefix(reg)
        .and_then(|t| t.strip_prefix('['))
        .and_then(|t| t.strip_suffix(']'))
        .and_then(|t| t.trim().parse::<usize>().ok())
        .ok_or_else(|| parse_error(line, format!("expected {}[index], found '{}'", reg, token)))
}

fn parse_angle(param: &str, line: usize) -> Result<f64> {
    let inner = param
        .strip_suffix(')')
        .ok_or_else(|| parse_error(line, "unterminated parameter list"))?
        .trim();
    match inner {
        "pi" => Ok(std::f64::consts::PI),
        "-pi" => Ok(-std::f64::consts::PI),
        _ => inner
            .parse::<f64>()
            .map_err(|_| parse_error(line, format!("invalid angle '{}'", inner))),
    }
}

fn single_qubit(qubits: &[QubitId], line: usize) -> Result<QubitId> {
    match qubits {
        [q] => Ok(*q),
        _ => Err(parse_error(line, format!("expected one qubit, found {}", qubits.len()))),
    }
}
