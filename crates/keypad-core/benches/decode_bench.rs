//! Criterion benchmarks for the per-report hot path.
//!
//! Every data indication from the radio stack goes through `decode` and, for
//! key-down reports, a table lookup.  Both run on the stack's own event
//! context, so they have to stay in the tens-of-nanoseconds range.
//!
//! Run with:
//! ```bash
//! cargo bench --package keypad-core --bench decode_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keypad_core::{decode, HidReport, KeyActionTable, ReportStatus};

fn bench_decode(c: &mut Criterion) {
    let key_down = HidReport::new(
        ReportStatus::Ok,
        vec![0x01, 0x00, 0x00, 0x62, 0x00, 0x00, 0x00, 0x00, 0x00],
    );
    let short = HidReport::new(ReportStatus::Ok, vec![0x01, 0x00, 0x00]);

    c.bench_function("decode_key_down", |b| {
        b.iter(|| decode(black_box(&key_down)))
    });
    c.bench_function("decode_short_report", |b| {
        b.iter(|| decode(black_box(&short)))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let table = KeyActionTable::keypad_default();

    c.bench_function("lookup_mapped", |b| b.iter(|| table.lookup(black_box(0x62))));
    c.bench_function("lookup_unmapped", |b| {
        b.iter(|| table.lookup(black_box(0x04)))
    });
}

criterion_group!(benches, bench_decode, bench_lookup);
criterion_main!(benches);
