use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use snookerlog::{
    core::store::MemoryRowStore,
    engine::season::{compute_season_stats, summarize_matches},
    record::{BreakRecord, FrameRecord, MatchRecord},
    service::ScoreService,
    types::{BestOf, BreakId, FrameId, MatchId, Player},
};

fn season(n_matches: u32) -> (Vec<MatchRecord>, Vec<FrameRecord>, Vec<BreakRecord>) {
    let mut matches = Vec::new();
    let mut frames = Vec::new();
    let mut breaks = Vec::new();
    for i in 0..n_matches {
        let m = MatchRecord {
            id: MatchId::new(),
            season: 2024,
            date: NaiveDate::from_yo_opt(2024, i % 365 + 1).expect("date"),
            best_of: BestOf::Seven,
            first_breaker: Some(Player::A),
            winner: None,
            notes: None,
        };
        for no in 1..=7u32 {
            let lead = (i + no) % 3 == 0;
            frames.push(FrameRecord {
                id: FrameId::new(),
                match_id: m.id,
                season: m.season,
                frame_no: no,
                score_a: if lead { 72 } else { 38 },
                score_b: if lead { 15 } else { 64 },
                winner: None,
                breaker: None,
            });
            breaks.push(BreakRecord {
                id: BreakId::new(),
                match_id: m.id,
                frame_id: None,
                season: m.season,
                player: if lead { Player::A } else { Player::B },
                points: 10 + (i * 7 + no) % 90,
            });
        }
        matches.push(m);
    }
    (matches, frames, breaks)
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_season_stats");
    for n in [50u32, 500, 5_000] {
        let (matches, frames, breaks) = season(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| compute_season_stats(&matches, &frames, &breaks));
        });
    }
    group.finish();
}

fn bench_summaries(c: &mut Criterion) {
    let (matches, frames, _) = season(2_000);
    c.bench_function("summarize_matches_2k", |b| {
        b.iter(|| summarize_matches(&matches, &frames));
    });
}

fn bench_overview(c: &mut Criterion) {
    let (matches, frames, breaks) = season(1_000);
    let store = MemoryRowStore::from_snapshot(snookerlog::core::store::StoreSnapshot {
        matches,
        frames,
        breaks,
    })
    .expect("load");
    let service = ScoreService::new(Arc::new(store));
    c.bench_function("season_overview_memory_1k", |b| {
        b.iter(|| service.season_overview(2024).expect("overview"));
    });
}

criterion_group!(benches, bench_compute, bench_summaries, bench_overview);
criterion_main!(benches);
