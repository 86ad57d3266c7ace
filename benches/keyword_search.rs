use std::hint::black_box;

use ai_history_search::models::{Record, Role, Session};
use ai_history_search::{HistoryIndex, QueryOptions};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn generate_index(num_sessions: usize) -> HistoryIndex {
    let sessions = (0..num_sessions).map(|s| {
        let mut session = Session::new(format!("s{:06}", s), format!("/logs/s{:06}.jsonl", s));
        for r in 0..10 {
            session.push(Record {
                role: if r % 2 == 0 { Role::User } else { Role::Assistant },
                segments: vec![format!(
                    "The {} handler returns error {} when the cache{} is cold",
                    ["auth", "billing", "search", "upload"][s % 4],
                    r * 100 + s % 13,
                    s % 97
                )],
                timestamp: None,
                uuid: None,
                cwd: None,
                git_branch: None,
                model: None,
                tool_names: Vec::new(),
            });
        }
        session
    });
    HistoryIndex::build(sessions)
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let index = generate_index(10_000);
    let options = QueryOptions::default();

    for query in ["auth", "billing error", "cache42", "nonexistent"].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.iter(|| index.search(black_box(query), &options));
        });
    }

    group.finish();
}

fn bench_list_sessions(c: &mut Criterion) {
    let index = generate_index(10_000);

    c.bench_function("list_sessions", |b| b.iter(|| black_box(index.list_sessions())));
}

criterion_group!(benches, bench_search, bench_list_sessions);
criterion_main!(benches);
