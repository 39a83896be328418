//! Build and evaluate throughput.
//!
//! Run with the `profile-with-puffin` feature to record scopes for the build
//! and evaluate entry points:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sharpexpr::eval::Evaluator;
use sharpexpr::{Binder, DefaultBinder, Expr, ExpressionBuilder, evaluate_with, standard_registry};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn finish_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn finish_frame() {}

/// `((x0 + 1.5) * x0) - Math.Max(x0, 2) ...` nested `depth` times.
fn arithmetic_chain(depth: usize) -> Expr {
    let mut expr = Expr::literal(1);
    for i in 0..depth {
        let step = Expr::binary(
            "*",
            Expr::binary("+", expr, Expr::literal(1.5)),
            Expr::literal(i as i32),
        );
        expr = Expr::binary(
            "-",
            step,
            Expr::method_call(
                Expr::reference("Math"),
                "Max",
                vec![Expr::literal(i as i64), Expr::literal(2)],
            ),
        );
    }
    expr
}

fn concat_chain(parts: usize) -> Expr {
    (1..parts).fold(Expr::literal("s"), |acc, i| {
        Expr::binary("+", acc, Expr::literal(i as i32))
    })
}

fn workloads() -> Vec<(&'static str, Expr)> {
    vec![
        ("arithmetic_10", arithmetic_chain(10)),
        ("arithmetic_100", arithmetic_chain(100)),
        ("concat_20", concat_chain(20)),
        (
            "string_members",
            Expr::method_call(
                Expr::method_call(Expr::literal("Hello, World"), "ToUpper", vec![]),
                "Substring",
                vec![Expr::literal(7)],
            ),
        ),
    ]
}

fn bench_build(c: &mut Criterion) {
    let Ok(registry) = standard_registry() else {
        return;
    };
    let binder = DefaultBinder::new(Arc::clone(&registry));
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(1));

    for (name, expr) in workloads() {
        group.bench_function(name, |b| {
            b.iter(|| ExpressionBuilder::new(&binder).build(black_box(&expr)))
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let Ok(registry) = standard_registry() else {
        return;
    };
    let binder = DefaultBinder::new(Arc::clone(&registry));
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(1));

    for (name, expr) in workloads() {
        let Ok(typed) = ExpressionBuilder::new(&binder).build(&expr) else {
            continue;
        };
        let evaluator = Evaluator::new(binder.types());
        group.bench_function(name, |b| b.iter(|| evaluator.eval(black_box(&typed))));
    }
    group.finish();
}

/// The public entry point, including the panic guard and failure mapping.
fn bench_pipeline(c: &mut Criterion) {
    setup_profiler();
    let Ok(registry) = standard_registry() else {
        return;
    };
    let binder = DefaultBinder::new(registry);
    let expr = arithmetic_chain(25);
    c.bench_function("pipeline/arithmetic_25", |b| {
        b.iter(|| {
            let value = evaluate_with(black_box(&expr), &binder, None);
            finish_frame();
            value
        })
    });
}

criterion_group!(benches, bench_build, bench_evaluate, bench_pipeline);
criterion_main!(benches);
