//! Change Path Validation Benchmarks
//!
//! Measures change-path rule validation and `extends` resolution across
//! synthetic pipeline configurations of increasing size.
//!
//! Run with: cargo bench --bench change_paths

use std::collections::HashSet;
use std::fmt::Write;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use revisar::ci::change_paths::validate;
use revisar::ci::resolve::resolve_extends;
use revisar::ci::CiConfig;

/// Build a pipeline with `jobs` test jobs, alternating between jobs
/// with a qualifying change rule and jobs with test-only paths.
fn synthetic_pipeline(jobs: usize) -> (CiConfig, Vec<(String, PathBuf)>) {
    let mut yaml = String::new();
    for i in 0..jobs {
        let path = if i % 2 == 0 {
            "pkg/**/*"
        } else {
            "test/new-e2e/**/*"
        };
        writeln!(
            yaml,
            "job-{i}:\n  rules:\n    - changes:\n        paths:\n          - {path}"
        )
        .unwrap();
    }

    let mapping: serde_yaml::Mapping = serde_yaml::from_str(&yaml).unwrap();
    let config = CiConfig::from_mapping(&mapping).unwrap();
    let test_jobs = (0..jobs)
        .map(|i| (format!("job-{i}"), PathBuf::from(".gitlab/e2e/e2e.yml")))
        .collect();
    (config, test_jobs)
}

fn bench_validate_by_job_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_by_job_count");

    for jobs in [10usize, 100, 1_000] {
        let (config, test_jobs) = synthetic_pipeline(jobs);
        let allow_list = HashSet::new();

        group.throughput(Throughput::Elements(jobs as u64));
        group.bench_with_input(BenchmarkId::new("jobs", jobs), &jobs, |b, _| {
            b.iter(|| {
                let report = validate(
                    black_box(&config),
                    black_box(&test_jobs),
                    black_box(&allow_list),
                )
                .unwrap();
                black_box(report);
            });
        });
    }

    group.finish();
}

fn bench_validate_with_allow_list(c: &mut Criterion) {
    let (config, test_jobs) = synthetic_pipeline(1_000);
    let allow_list: HashSet<String> = (0..500).map(|i| format!("job-{i}")).collect();

    c.bench_function("validate_with_allow_list", |b| {
        b.iter(|| {
            let report = validate(
                black_box(&config),
                black_box(&test_jobs),
                black_box(&allow_list),
            )
            .unwrap();
            black_box(report);
        });
    });
}

fn bench_resolve_extends_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_extends");

    for jobs in [10usize, 100, 1_000] {
        let mut yaml = String::from(
            ".base:\n  image: runner:latest\n  variables:\n    TEAM: agent\n  script:\n    - ./setup.sh\n",
        );
        for i in 0..jobs {
            writeln!(
                yaml,
                "job-{i}:\n  extends: .base\n  variables:\n    INDEX: \"{i}\""
            )
            .unwrap();
        }
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(&yaml).unwrap();

        group.throughput(Throughput::Elements(jobs as u64));
        group.bench_with_input(BenchmarkId::new("jobs", jobs), &jobs, |b, _| {
            b.iter(|| {
                let resolved = resolve_extends(black_box(&mapping)).unwrap();
                black_box(resolved);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_validate_by_job_count,
    bench_validate_with_allow_list,
    bench_resolve_extends_chain
);
criterion_main!(benches);
