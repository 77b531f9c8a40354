//! Benchmarks for the qasmi front end and evaluator
//!
//! Run with: cargo bench -p qasmi-eval

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qasmi_eval::{EvalConfig, Evaluator};
use qasmi_qasm3::parse;

/// A QFT written with a user gate and controlled phases, followed by the
/// built-in inverse.
fn qft_program(n: usize) -> String {
    let mut source = format!(
        "OPENQASM 3.0;\n\
         gate cphase(theta) c, t {{ ctrl @ U(0, 0, theta) c, t; }}\n\
         qubit[{n}] q;\n\
         bit[{n}] c;\n\
         x q[0];\n"
    );
    for j in 0..n {
        source.push_str(&format!("h q[{j}];\n"));
        for k in (j + 1)..n {
            source.push_str(&format!("cphase(pi / {}) q[{k}], q[{j}];\n", 1u64 << (k - j)));
        }
    }
    source.push_str("IQFT q;\nc = measure q;\n");
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for n in &[4, 8, 12] {
        let source = qft_program(*n);
        group.bench_with_input(BenchmarkId::new("qft", n), &source, |b, source| {
            b.iter(|| parse(black_box(source)).unwrap());
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    for n in &[4, 8, 12] {
        let program = parse(&qft_program(*n)).unwrap();
        group.bench_with_input(BenchmarkId::new("qft", n), &program, |b, program| {
            b.iter(|| {
                let mut evaluator = Evaluator::with_config(EvalConfig::default().with_seed(1));
                evaluator.eval_program(black_box(program)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_modifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("modifiers");

    let program = parse(
        "gate g a { h a; t a; s a; }
         qubit[3] q;
         ctrl(2) @ pow(8) @ inv @ g q[0], q[1], q[2];",
    )
    .unwrap();
    group.bench_function("ctrl_pow_inv_gate", |b| {
        b.iter(|| {
            let mut evaluator = Evaluator::with_config(EvalConfig::default().with_seed(1));
            evaluator.eval_program(black_box(&program)).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_eval, bench_modifiers);
criterion_main!(benches);
