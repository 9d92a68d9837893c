use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fatigue_guard::window::days_before;
use fatigue_guard::{evaluate_team, DailyRecord, FatigueMetricsEngine, PlayerRecords, WellnessItems};

/// Performance benchmarks for the fatigue engine
///
/// Evaluation is meant to run for a whole squad on every page load, so these
/// cover a single evaluation, the trend chart and a team sweep.

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 28).unwrap()
}

/// `days` of daily reports with some variation and the odd missed day
fn create_player_history(player_id: &str, days: u64) -> Vec<DailyRecord> {
    (0..days)
        .filter(|d| d % 9 != 4)
        .map(|d| {
            let minutes = 30 + (d as i32 * 7) % 60;
            let rpe = 2 + (d as i32 * 3) % 8;
            DailyRecord::new(player_id, days_before(reference_date(), d))
                .with_rhr(50 + (d as i32 % 5))
                .with_wellness(WellnessItems::uniform(3 + (d % 3) as u8))
                .with_training(minutes, rpe)
        })
        .collect()
}

fn create_team(players: usize) -> Vec<PlayerRecords> {
    (0..players)
        .map(|i| {
            let player_id = format!("player_{i:03}");
            let records = create_player_history(&player_id, 60);
            PlayerRecords { player_id, records }
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = FatigueMetricsEngine::new();
    let mut group = c.benchmark_group("Evaluate");

    // Callers often pass more history than the lookback window needs
    for &days in &[28u64, 90, 365] {
        let records = create_player_history("player_001", days);

        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::new("evaluate", days), &records, |b, records| {
            b.iter(|| engine.evaluate(black_box("player_001"), black_box(reference_date()), black_box(records)));
        });
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let engine = FatigueMetricsEngine::new();
    let records = create_player_history("player_001", 120);
    let mut group = c.benchmark_group("History");

    for &days in &[7u16, 14, 90] {
        group.bench_with_input(BenchmarkId::new("acwr_trend", days), &days, |b, &days| {
            b.iter(|| engine.history("player_001", reference_date(), black_box(days), &records));
        });
    }

    group.finish();
}

fn bench_team(c: &mut Criterion) {
    let engine = FatigueMetricsEngine::new();
    let mut group = c.benchmark_group("Team");

    for &players in &[25usize, 100, 500] {
        let team = create_team(players);

        group.throughput(Throughput::Elements(players as u64));
        group.bench_with_input(BenchmarkId::new("evaluate_team", players), &team, |b, team| {
            b.iter(|| evaluate_team(&engine, black_box(reference_date()), team));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_history, bench_team);
criterion_main!(benches);
