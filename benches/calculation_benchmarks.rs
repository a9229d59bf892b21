//! Performance benchmarks for the child support engine.
//!
//! Covers a single assessment, batches of assessments with varied inputs,
//! and projecting a court order over the full care horizon.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use child_support_engine::calculation::AssessmentEngine;
use child_support_engine::care::{CareCalculator, SchoolCalendar};
use child_support_engine::config::ConfigLoader;
use child_support_engine::models::{Child, ChildCare, CourtOrderJson, OtherCase, ParentFinancials};

const YEAR: u16 = 2026;

const COURT_ORDER: &str = r#"{
    "start_date": "2026-02-02",
    "pattern": {
        "type": "weekly_alternating",
        "week_a": { "mother": ["mon", "tue", "wed", "thu", "fri"], "father": ["sat", "sun"] }
    },
    "exceptions": [
        { "type": "annual_dates", "month": 12, "start_day": 24, "end_day": 26, "label": "Christmas",
          "parent_rule": { "type": "alternating_years", "even_years": "father" } },
        { "type": "school_holidays", "blocks": ["term1", "term2", "term3", "summer"],
          "split": { "type": "alternating_weeks", "first_week": { "type": "fixed", "parent": "mother" } } }
    ]
}"#;

fn create_engine() -> AssessmentEngine {
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    AssessmentEngine::new(config.rate_tables())
}

fn create_case(i: u32) -> (ParentFinancials, ParentFinancials, Vec<Child>) {
    let income_a = Decimal::from(40_000 + (i * 1_750) % 160_000);
    let income_b = Decimal::from(15_000 + (i * 3_100) % 90_000);
    let care_a = Decimal::from((i * 7) % 101);

    let mut parent_a = ParentFinancials::new(income_a);
    if i % 4 == 0 {
        parent_a = parent_a.with_other_case(OtherCase {
            children_ages: vec![3],
            at_minimum_rate: false,
        });
    }
    let parent_b = ParentFinancials::new(income_b).with_relevant_dependents(u8::from(i % 5 == 0), 0);

    let children = (0..(1 + i % 3))
        .map(|n| {
            let age = u8::try_from((i + n * 5) % 18).unwrap_or(0);
            Child::new(age, ChildCare::percentages(care_a, Decimal::ONE_HUNDRED - care_a))
        })
        .collect();

    (parent_a, parent_b, children)
}

/// Benchmark: Single assessment with two children.
fn bench_single_assessment(c: &mut Criterion) {
    let engine = create_engine();
    let (parent_a, parent_b, children) = create_case(1);

    c.bench_function("single_assessment", |b| {
        b.iter(|| {
            black_box(
                engine
                    .compute_assessment(&parent_a, &parent_b, &children, YEAR)
                    .unwrap(),
            )
        })
    });
}

/// Benchmark: Batches of assessments with varied incomes, care and ages.
fn bench_batch_assessments(c: &mut Criterion) {
    let engine = create_engine();

    let mut group = c.benchmark_group("batch_processing");

    for batch_size in [100_u32, 1000].iter() {
        let cases: Vec<_> = (0..*batch_size).map(create_case).collect();

        group.throughput(Throughput::Elements(u64::from(*batch_size)));
        if *batch_size >= 1000 {
            group.sample_size(10);
        }
        group.bench_with_input(BenchmarkId::new("assessments", batch_size), &cases, |b, cases| {
            b.iter(|| {
                let results: Vec<_> = cases
                    .iter()
                    .map(|(a, b, children)| engine.compute_assessment(a, b, children, YEAR).unwrap())
                    .collect();
                black_box(results)
            })
        });
    }

    group.finish();
}

/// Benchmark: Projecting a court order with holiday exceptions over the horizon.
fn bench_care_calendar(c: &mut Criterion) {
    let calendar = SchoolCalendar::builtin().expect("Failed to load school calendar");
    let order = CourtOrderJson::from_json_str(COURT_ORDER).expect("Failed to parse order");
    let anchor = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
    let as_of = NaiveDate::from_ymd_opt(2027, 2, 2).unwrap();

    c.bench_function("care_calendar_730_nights", |b| {
        b.iter(|| {
            let result = CareCalculator::new(&order, anchor, "VIC", &calendar)
                .unwrap()
                .as_of(as_of)
                .calculate()
                .unwrap();
            black_box(result)
        })
    });
}

criterion_group!(
    benches,
    bench_single_assessment,
    bench_batch_assessments,
    bench_care_calendar,
);
criterion_main!(benches);
