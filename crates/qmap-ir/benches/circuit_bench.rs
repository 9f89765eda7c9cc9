//! Benchmarks for qmap circuit operations
//!
//! Run with: cargo bench -p qmap-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qmap_ir::{Circuit, Instruction, QubitId, StandardGate};

/// Benchmark validated gate appends
fn bench_gate_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_addition");

    group.bench_function("h_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit.h(black_box(QubitId(0))).unwrap();
        });
    });

    group.bench_function("cx_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit
                .cx(black_box(QubitId(0)), black_box(QubitId(1)))
                .unwrap();
        });
    });

    group.finish();
}

/// Benchmark depth computation on QFT circuits
fn bench_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth");

    for num_qubits in &[5u32, 10, 20, 40] {
        let circuit = Circuit::qft(*num_qubits).unwrap();
        group.bench_with_input(BenchmarkId::new("qft", num_qubits), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit).depth());
        });
    }

    group.finish();
}

/// Benchmark interaction graph construction
fn bench_interaction_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("interaction_graph");

    for num_qubits in &[5u32, 10, 20, 40] {
        let circuit = Circuit::qft(*num_qubits).unwrap();
        group.bench_with_input(BenchmarkId::new("qft", num_qubits), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit).interaction_graph());
        });
    }

    group.finish();
}

/// Benchmark splicing a swap network into the middle of a circuit
fn bench_splice(c: &mut Criterion) {
    let base = Circuit::qft(20).unwrap();
    let mid = base.num_ops() / 2;

    c.bench_function("splice_middle", |b| {
        b.iter(|| {
            let mut circuit = base.clone();
            circuit
                .splice(
                    mid..mid + 1,
                    [
                        Instruction::two_qubit_gate(StandardGate::Swap, QubitId(3), QubitId(4)),
                        Instruction::two_qubit_gate(StandardGate::CX, QubitId(4), QubitId(5)),
                    ],
                )
                .unwrap();
            black_box(circuit)
        });
    });
}

criterion_group!(
    benches,
    bench_gate_addition,
    bench_depth,
    bench_interaction_graph,
    bench_splice
);
criterion_main!(benches);
