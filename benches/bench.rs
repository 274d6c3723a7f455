// Criterion benchmarks for Padel Booker

use chrono::NaiveTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use padel_booker::core::{filters::parse_slot_start, FreeMethodPolicy, SlotMatcher};
use padel_booker::models::{AvailabilityEntry, PaymentMethod, Preferences, Slot};
use serde_json::json;

/// One court-day with `count` slots every 30 minutes from 06:00 UTC, mixed durations
fn create_entry(count: usize) -> AvailabilityEntry {
    let slots = (0..count)
        .map(|i| {
            let minutes = 6 * 60 + (i % 36) * 30;
            Slot {
                start_time: format!("{:02}:{:02}:00", minutes / 60, minutes % 60),
                duration: [60, 90, 120][i % 3],
                price: Some(json!("24 EUR")),
            }
        })
        .collect();

    AvailabilityEntry {
        resource_id: "court-1".to_string(),
        start_date: "2026-10-20".to_string(),
        slots,
    }
}

fn create_preferences() -> Preferences {
    Preferences {
        preferred_hours: vec![
            NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        ],
        ..Preferences::default()
    }
}

fn bench_parse_slot_start(c: &mut Criterion) {
    c.bench_function("parse_slot_start", |b| {
        b.iter(|| parse_slot_start(black_box("2026-10-20"), black_box("17:30:00")));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = SlotMatcher::new(create_preferences());

    let mut group = c.benchmark_group("matching");

    for slot_count in [10, 50, 100, 500].iter() {
        let entry = create_entry(*slot_count);

        group.bench_with_input(BenchmarkId::new("find_candidates", slot_count), slot_count, |b, _| {
            b.iter(|| matcher.find_candidates(black_box(&entry)));
        });
    }

    group.finish();
}

fn bench_free_method_selection(c: &mut Criterion) {
    let policy = FreeMethodPolicy::with_extra_indicators(["bono", "abono"]);
    let methods: Vec<PaymentMethod> = ["Credit Card", "Apple Pay", "Wallet", "Pay at the club"]
        .iter()
        .map(|name| PaymentMethod {
            payment_method_id: Some(name.to_uppercase()),
            name: Some(name.to_string()),
            amount: Some(json!(24)),
            ..PaymentMethod::default()
        })
        .collect();

    c.bench_function("free_method_selection", |b| {
        b.iter(|| policy.select(black_box(&methods)));
    });
}

criterion_group!(benches, bench_parse_slot_start, bench_matching, bench_free_method_selection);

criterion_main!(benches);
