//! Instruction-arena circuit with a fluent builder API.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId, Wire};

/// Abstraction level of a circuit.
///
/// Circuits start at the `Logical` level (abstract qubits) and are
/// lowered to the `Physical` level by routing, after which every
/// [`QubitId`] names a device node by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitLevel {
    /// Qubits are abstract, no physical mapping applied.
    #[default]
    Logical,
    /// Qubits are device node indices.
    Physical,
}

/// A quantum circuit.
///
/// Instructions live in a flat arena in program order. Wires are declared
/// up front and every instruction is validated against the declarations
/// when it is appended or spliced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    #[serde(default)]
    name: String,
    /// Declared qubits.
    qubits: BTreeSet<QubitId>,
    /// Declared classical bits.
    #[serde(default)]
    clbits: BTreeSet<ClbitId>,
    /// Instructions in program order.
    #[serde(default)]
    instructions: Vec<Instruction>,
    /// Global phase of the circuit.
    #[serde(default)]
    global_phase: f64,
    /// Abstraction level.
    #[serde(default)]
    level: CircuitLevel,
    /// Implicit end-of-circuit permutation as `(start wire, end wire)` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    implicit_permutation: Vec<(QubitId, QubitId)>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: BTreeSet::new(),
            clbits: BTreeSet::new(),
            instructions: vec![],
            global_phase: 0.0,
            level: CircuitLevel::Logical,
            implicit_permutation: vec![],
        }
    }

    /// Create a circuit with qubits `0..num_qubits` and clbits `0..num_clbits`.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        circuit.qubits.extend((0..num_qubits).map(QubitId));
        circuit.clbits.extend((0..num_clbits).map(ClbitId));
        circuit
    }

    /// Create an empty physical circuit over device nodes `0..num_nodes`.
    pub fn physical(
        name: impl Into<String>,
        num_nodes: usize,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        let mut circuit = Self::new(name);
        circuit.qubits.extend((0..num_nodes).map(QubitId::from_index));
        circuit.clbits.extend(clbits);
        circuit.level = CircuitLevel::Physical;
        circuit
    }

    /// Add a fresh qubit after the highest declared one.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.qubits.last().map_or(QubitId(0), |q| QubitId(q.0 + 1));
        self.qubits.insert(id);
        id
    }

    /// Add a fresh classical bit after the highest declared one.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = self.clbits.last().map_or(ClbitId(0), |c| ClbitId(c.0 + 1));
        self.clbits.insert(id);
        id
    }

    /// Declare a specific qubit. Returns `false` if it was already declared.
    pub fn declare_qubit(&mut self, qubit: QubitId) -> bool {
        self.qubits.insert(qubit)
    }

    /// Declare a specific classical bit. Returns `false` if it was already declared.
    pub fn declare_clbit(&mut self, clbit: ClbitId) -> bool {
        self.clbits.insert(clbit)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    fn apply_1q(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(gate, qubit))?;
        Ok(self)
    }

    fn apply_2q(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(gate, q1, q2))?;
        Ok(self)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::SX, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::P(lambda), qubit)
    }

    /// Apply U(θ, φ, λ) gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::U(theta, phi, lambda), qubit)
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CX, control, target)
    }

    /// Apply controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CY, control, target)
    }

    /// Apply controlled-Z gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CZ, q1, q2)
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CH, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::Swap, q1, q2)
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::ISwap, q1, q2)
    }

    /// Apply controlled-Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CRz(theta), control, target)
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, lambda: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::CP(lambda), q1, q2)
    }

    /// Apply XX rotation gate.
    pub fn rxx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::RXX(theta), q1, q2)
    }

    /// Apply ZZ rotation gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply_2q(StandardGate::RZZ(theta), q1, q2)
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))?;
        Ok(self)
    }

    /// Apply a distance-2 CNOT through `mid`.
    pub fn bridge(&mut self, control: QubitId, mid: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::Bridge, [control, mid, target]))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate, e.g. a conditioned or custom one.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit into the clbit of the same rank, adding clbits as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let pairs: Vec<_> = self
            .qubits
            .iter()
            .copied()
            .zip(self.clbits.iter().copied())
            .collect();
        for (qubit, clbit) in pairs {
            self.apply(Instruction::measure(qubit, clbit))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().copied().collect();
        self.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Arena editing
    // =========================================================================

    /// Check an instruction against the declared wires.
    pub fn check_instruction(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits() as usize;
                let got = instruction.qubits.len();
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_string(),
                        expected: gate.num_qubits(),
                        got: u32::try_from(got).unwrap_or(u32::MAX),
                    });
                }
                if !instruction.clbits.is_empty() {
                    return Err(IrError::InvalidInstruction(format!(
                        "gate '{}' cannot write classical bits",
                        gate.name()
                    )));
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(IrError::InvalidInstruction(format!(
                        "measure: qubit count ({}) does not match clbit count ({})",
                        instruction.qubits.len(),
                        instruction.clbits.len(),
                    )));
                }
            }
            InstructionKind::Reset | InstructionKind::Barrier => {}
        }

        if instruction.qubits.is_empty() {
            return Err(IrError::InvalidInstruction(format!(
                "'{}' acts on no qubits",
                instruction.name()
            )));
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.qubits.contains(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let condition_bits = instruction
            .condition()
            .map(|c| c.clbits.as_slice())
            .unwrap_or(&[]);
        for &clbit in instruction.clbits.iter().chain(condition_bits) {
            if !self.clbits.contains(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Append an instruction, returning its arena index.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<usize> {
        self.check_instruction(&instruction)?;
        self.instructions.push(instruction);
        Ok(self.instructions.len() - 1)
    }

    /// Append several instructions; nothing is appended if any is invalid.
    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> IrResult<()> {
        let instructions: Vec<_> = instructions.into_iter().collect();
        for inst in &instructions {
            self.check_instruction(inst)?;
        }
        self.instructions.extend(instructions);
        Ok(())
    }

    /// Replace the instructions in `range` by `replacement`, returning the
    /// removed instructions.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        replacement: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Vec<Instruction>> {
        if range.start > range.end || range.end > self.instructions.len() {
            return Err(IrError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.instructions.len(),
            });
        }
        let replacement: Vec<_> = replacement.into_iter().collect();
        for inst in &replacement {
            self.check_instruction(inst)?;
        }
        Ok(self.instructions.splice(range, replacement).collect())
    }

    /// Re-check every instruction and the implicit permutation, e.g. after
    /// deserialization.
    pub fn validate(&self) -> IrResult<()> {
        for inst in &self.instructions {
            self.check_instruction(inst)?;
        }
        self.check_permutation(&self.implicit_permutation)
    }

    // =========================================================================
    // Implicit permutation
    // =========================================================================

    fn check_permutation(&self, pairs: &[(QubitId, QubitId)]) -> IrResult<()> {
        let mut sources = BTreeSet::new();
        let mut targets = BTreeSet::new();
        for &(from, to) in pairs {
            for q in [from, to] {
                if !self.qubits.contains(&q) {
                    return Err(IrError::QubitNotFound {
                        qubit: q,
                        gate_name: None,
                    });
                }
            }
            if !sources.insert(from) || !targets.insert(to) {
                return Err(IrError::InvalidInstruction(
                    "implicit permutation is not injective".into(),
                ));
            }
        }
        if sources != targets {
            return Err(IrError::InvalidInstruction(
                "implicit permutation does not map its wires onto themselves".into(),
            ));
        }
        Ok(())
    }

    /// Declare that the state entering on wire `from` leaves on wire `to`.
    ///
    /// Fixed points may be omitted. Pairs are stored sorted by source.
    pub fn set_implicit_permutation(
        &mut self,
        pairs: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> IrResult<()> {
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        self.check_permutation(&pairs)?;
        pairs.sort_unstable();
        self.implicit_permutation = pairs;
        Ok(())
    }

    /// Clear the implicit permutation.
    pub fn clear_implicit_permutation(&mut self) {
        self.implicit_permutation.clear();
    }

    /// The implicit end-of-circuit permutation, sorted by source wire.
    pub fn implicit_permutation(&self) -> &[(QubitId, QubitId)] {
        &self.implicit_permutation
    }

    /// Where the state entering on `wire` ends up.
    pub fn permuted(&self, wire: QubitId) -> QubitId {
        self.implicit_permutation
            .binary_search_by_key(&wire, |&(from, _)| from)
            .map_or(wire, |i| self.implicit_permutation[i].1)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Declared qubits in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubits.iter().copied()
    }

    /// Declared classical bits in ascending order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbits.iter().copied()
    }

    /// Whether `qubit` is declared.
    pub fn contains_qubit(&self, qubit: QubitId) -> bool {
        self.qubits.contains(&qubit)
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit and return its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of instructions.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// Circuit depth: the longest chain of instructions sharing a wire.
    pub fn depth(&self) -> usize {
        let mut wire_depth: FxHashMap<Wire, usize> = FxHashMap::default();
        let mut max_depth = 0;
        for inst in &self.instructions {
            let wires = inst.wires();
            let layer = 1 + wires
                .iter()
                .map(|w| wire_depth.get(w).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            for w in wires {
                wire_depth.insert(w, layer);
            }
            max_depth = max_depth.max(layer);
        }
        max_depth
    }

    /// Instruction counts by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of gates acting on exactly two qubits.
    pub fn num_two_qubit_gates(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .count()
    }

    /// Qubits in order of first use, followed by idle qubits in declaration order.
    pub fn encounter_order(&self) -> Vec<QubitId> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::with_capacity(self.qubits.len());
        for inst in &self.instructions {
            for &q in &inst.qubits {
                if seen.insert(q) {
                    order.push(q);
                }
            }
        }
        for &q in &self.qubits {
            if seen.insert(q) {
                order.push(q);
            }
        }
        order
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a GHZ state circuit with measurements.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }

    /// Create a QFT circuit (without measurements).
    ///
    /// Every qubit pair interacts, which makes it a convenient worst case
    /// for sparse devices.
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::with_size("qft", n, 0);
        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                let angle = PI / f64::from(1u32 << (j - i).min(31));
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(circuit)
    }
}
