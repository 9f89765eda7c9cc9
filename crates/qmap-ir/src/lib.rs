//! qmap Circuit Model
//!
//! This crate provides the logical circuit representation consumed by the
//! qmap qubit router. It is deliberately small: routing only needs to know
//! which wires every instruction touches and in which order.
//!
//! # Overview
//!
//! A [`Circuit`] is an arena of [`Instruction`]s in program order over a
//! declared set of qubit and classical-bit wires. Every instruction is
//! validated against the declarations when it is added, so downstream code
//! can rely on operands being declared and distinct.
//!
//! # Core Components
//!
//! - **Wires**: [`QubitId`], [`ClbitId`] and [`Wire`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   opaque boxes; a [`ClassicalCondition`] makes a gate depend on clbits
//! - **Instructions**: [`Instruction`] combining a gate, measure, reset or
//!   barrier with its operands
//! - **Circuit**: [`Circuit`] with a fluent builder API and an implicit
//!   end-of-circuit permutation
//! - **Interactions**: [`InteractionGraph`] weighting qubit pairs by the
//!   number of gates between them
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qmap_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled gates |
//! | `Swap`, `ISwap` | 2 | Exchange gates |
//! | `CRz`, `CP`, `RXX`, `RZZ` | 2 | Parameterized two-qubit gates |
//! | `CCX` | 3 | Toffoli (CCNOT) gate |
//! | `Bridge` | 3 | Distance-2 CNOT inserted by the router |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod interaction;
pub mod qubit;

pub use circuit::{Circuit, CircuitLevel};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use interaction::InteractionGraph;
pub use qubit::{ClbitId, QubitId, Wire};
