//! Benchmarks for catalog filtering and sorting.

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use convo_lens::filters::{
    filter_projects, filter_sessions, DateBucket, SessionFilters, SizeBucket, SortKey,
};
use convo_lens::model::{Project, Session};

fn synthetic_projects(count: usize) -> Vec<Project> {
    (0..count)
        .map(|i| Project {
            id: format!("project-{i}"),
            name: format!("workspace/project-{i}"),
            custom_name: (i % 3 == 0).then(|| format!("Renamed {i}")),
            tags: vec![format!("team-{}", i % 7), "rust".to_string()],
            session_count: i % 40,
        })
        .collect()
}

fn synthetic_sessions(count: usize) -> Vec<Session> {
    let base = Utc::now();
    (0..count)
        .map(|i| Session {
            id: format!("session-{i}"),
            summary: format!("session number {i}"),
            message_count: (i * 13) % 400,
            size: ((i * 7919) % 2_000_000) as u64,
            first_timestamp: Some(base - Duration::days((i % 90) as i64)),
            last_timestamp: Some(base - Duration::days((i % 60) as i64)),
            subagent_count: i % 4,
        })
        .collect()
}

fn bench_filter_projects(c: &mut Criterion) {
    let projects = synthetic_projects(1_000);

    c.bench_function("filter_projects/text_query", |b| {
        b.iter(|| filter_projects(black_box(&projects), black_box("project-5"), None));
    });

    c.bench_function("filter_projects/tag", |b| {
        b.iter(|| filter_projects(black_box(&projects), "", black_box(Some("team-3"))));
    });
}

fn bench_filter_sessions(c: &mut Criterion) {
    let sessions = synthetic_sessions(10_000);
    let now = Utc::now();

    let all_axes = SessionFilters {
        size: Some(SizeBucket::TenTo100Kb),
        date: Some(DateBucket::Month),
        sort: SortKey::Largest,
    };
    c.bench_function("filter_sessions/all_axes", |b| {
        b.iter(|| filter_sessions(black_box(&sessions), black_box(&all_axes), now));
    });

    let sort_only = SessionFilters::default();
    c.bench_function("filter_sessions/sort_newest", |b| {
        b.iter(|| filter_sessions(black_box(&sessions), black_box(&sort_only), now));
    });
}

criterion_group!(benches, bench_filter_projects, bench_filter_sessions);
criterion_main!(benches);
