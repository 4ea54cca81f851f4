//! Criterion benchmarks for candidate ranking.
//!
//! Covers query analysis, single-candidate scoring and batch ranking on
//! both sides of the parallel threshold.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use talent_match::ml::clustering::KMeans;
use talent_match::prelude::*;

const SKILLS: &[&str] = &[
    "rust", "python", "react", "node", "typescript", "java", "kotlin", "swift", "aws", "docker",
    "kubernetes", "sql", "graphql", "figma", "terraform",
];
const LOCATIONS: &[&str] = &["London", "Berlin", "Paris", "Austin", "Tokyo", "Remote", "Toronto"];
const TITLES: &[&str] = &[
    "Senior Backend Engineer",
    "Junior Frontend Developer",
    "Data Scientist",
    "Product Designer",
    "Lead DevOps Engineer",
];
const AVAILABILITY: &[&str] = &["Full-time", "Part-time", "Contract"];

/// Generate a deterministic candidate pool.
fn generate_candidates(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| {
            let skills: Vec<&str> = (0..1 + i % 5)
                .map(|j| SKILLS[(i * 7 + j * 3) % SKILLS.len()])
                .collect();
            Candidate::new(format!("cand-{i}"), format!("Candidate {i}"))
                .with_title(TITLES[i % TITLES.len()])
                .with_skills(skills)
                .with_experience((i % 15) as f64)
                .with_location(LOCATIONS[i % LOCATIONS.len()])
                .with_availability(AVAILABILITY[i % AVAILABILITY.len()])
                .with_rating(3.0 + (i % 21) as f64 / 10.0)
                .verified(i % 3 == 0)
                .with_projects((i % 90) as u32)
                .with_certifications((i % 6) as u32)
        })
        .collect()
}

fn bench_query_analysis(c: &mut Criterion) {
    let analyzer = QueryAnalyzer::default();
    c.bench_function("query_analyze", |b| {
        let query = "Senior React and Node developer in London, full-time";
        b.iter(|| analyzer.analyze(black_box(query)))
    });
}

fn bench_single_score(c: &mut Criterion) {
    let scorer = CompositeScorer::default();
    let facets = QueryAnalyzer::default().analyze("senior rust engineer in europe, contract");
    let candidate = &generate_candidates(1)[0];
    c.bench_function("composite_score", |b| {
        b.iter(|| scorer.score(black_box(candidate), black_box(&facets)))
    });
}

fn bench_ranking(c: &mut Criterion) {
    let engine = match MatchEngine::new(EngineConfig::default()) {
        Ok(engine) => engine,
        Err(e) => panic!("engine construction failed: {e}"),
    };
    let mut group = c.benchmark_group("search");

    for size in [32, 1_000, 10_000] {
        let candidates = generate_candidates(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| {
                engine.search(
                    black_box("python developer in berlin, full-time"),
                    candidates,
                    Some(20),
                )
            })
        });
    }

    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let vectors = CandidateFeatures::extract_all(&generate_candidates(2_000));
    let kmeans = KMeans::with_seed(42);
    c.bench_function("kmeans_2000x5_k8", |b| {
        b.iter(|| kmeans.cluster(black_box(&vectors), 8))
    });
}

criterion_group!(
    benches,
    bench_query_analysis,
    bench_single_score,
    bench_ranking,
    bench_clustering
);
criterion_main!(benches);
