use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goaledge::model::GoalModel;
use goaledge::types::{Fixture, TeamMatchRecord};

fn history() -> Vec<TeamMatchRecord> {
    let teams = ["Lions", "Goats", "Bears", "Wolves", "Hawks", "Otters"];
    let mut records = Vec::new();
    for round in 0..20u32 {
        for (i, home) in teams.iter().enumerate() {
            let away = teams[(i + 1 + round as usize) % teams.len()];
            if *home == away {
                continue;
            }
            let mut r = TeamMatchRecord::new(home, away, (round + i as u32) % 4, round % 3);
            r.home_corners = Some(f64::from(4 + round % 5));
            r.away_corners = Some(f64::from(3 + (i as u32) % 4));
            records.push(r);
        }
    }
    records
}

fn bench_fit_predict(c: &mut Criterion) {
    let model = GoalModel::default();
    let records = history();
    let fixture = Fixture::new(1, "Lions", "Goats");

    c.bench_function("fit_predict", |b| {
        b.iter(|| model.fit_predict(black_box(&fixture), black_box(&records)))
    });
}

criterion_group!(benches, bench_fit_predict);
criterion_main!(benches);
