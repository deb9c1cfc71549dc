//! Performance benchmarks for bill-kit
//!
//! This benchmark suite measures:
//! - Figure computation (total, tax, change due, preview)
//! - Draft validation
//! - Bill number generation
//! - Submission and history listing against the in-memory store
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use bill_kit::calculator::{compute_change_due, compute_total, BillPreview, TaxPolicy};
use bill_kit::store::InMemoryStore;
use bill_kit::validation::validate;
use bill_kit::{BillDraft, BillLedger, BillNumberGenerator, BillingConfig, PaymentMethod};
use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

// ============================================================================
// Benchmark Fixtures
// ============================================================================

fn bench_draft(charge: &str) -> BillDraft {
    BillDraft {
        service_type: "Plumbing".to_string(),
        service_provider_name: "Ravi".to_string(),
        customer_name: "Asha".to_string(),
        address: "12 MG Road".to_string(),
        contact_number: "9876543210".to_string(),
        service_charge: charge.to_string(),
        notes: "Replaced kitchen tap".to_string(),
        payment_method: PaymentMethod::Cash,
        cash_given: "5000".to_string(),
    }
}

// ============================================================================
// Group 1: Figures
// ============================================================================

fn calculator_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculator");
    let gst = TaxPolicy::gst_25();

    group.bench_function("total_no_tax", |b| {
        b.iter(|| compute_total(black_box("1234.567"), &TaxPolicy::None));
    });

    group.bench_function("total_gst", |b| {
        b.iter(|| compute_total(black_box("1234.567"), &gst));
    });

    group.bench_function("total_unparseable", |b| {
        b.iter(|| compute_total(black_box("twelve hundred"), &gst));
    });

    let total = compute_total("1234.567", &gst);
    group.bench_function("change_due", |b| {
        b.iter(|| compute_change_due(black_box(total), black_box("2000")));
    });

    let draft = bench_draft("1234.567");
    group.bench_function("preview", |b| {
        b.iter(|| BillPreview::compute(black_box(&draft), &gst));
    });

    group.bench_function("validate", |b| {
        b.iter(|| validate(black_box(&draft)));
    });

    group.finish();
}

// ============================================================================
// Group 2: Bill numbers
// ============================================================================

fn bill_number_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("bill_number");
    let now = Utc::now();

    for len in [4usize, 6, 8].iter() {
        let generator = BillNumberGenerator::new().with_suffix_len(*len);
        group.bench_with_input(BenchmarkId::new("generate", len), &generator, |b, g| {
            b.iter(|| g.generate(black_box(now)));
        });
    }

    group.finish();
}

// ============================================================================
// Group 3: Ledger over the in-memory store
// ============================================================================

fn ledger_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let draft = bench_draft("450");

    group.bench_function("submit", |b| {
        // Wide suffix keeps a long run clear of the conflict budget
        let ledger = BillLedger::with_config(
            InMemoryStore::new(),
            BillingConfig::default().with_suffix_len(10),
        );
        b.to_async(&rt)
            .iter(|| async { ledger.submit(black_box(&draft)).await.expect("Failed to submit") });
    });

    for size in [10usize, 100, 1_000].iter() {
        let ledger = BillLedger::new(InMemoryStore::new());
        rt.block_on(async {
            for _ in 0..*size {
                ledger.submit(&draft).await.expect("Failed to seed");
            }
        });

        group
            .throughput(Throughput::Elements(*size as u64))
            .bench_with_input(BenchmarkId::new("list_recent", size), size, |b, _| {
                b.to_async(&rt)
                    .iter(|| async { ledger.try_list_recent(black_box(Some(20))).await });
            });
    }

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(
    benches,
    calculator_benchmarks,
    bill_number_benchmarks,
    ledger_benchmarks
);
criterion_main!(benches);
