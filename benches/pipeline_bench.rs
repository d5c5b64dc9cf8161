use criterion::{criterion_group, criterion_main, Criterion, black_box};
use fenmaker::record::GameRecord;
use fenmaker::{annotate, reproduce, ReplayConfig};

const GAME: &str = include_str!("../tests/data/full_a.pgn");

fn bench_pipeline(c: &mut Criterion) {
    let rec = GameRecord::parse(GAME);
    let fen = rec.start_fen();
    let cfg = ReplayConfig::default();
    c.bench_function("tokenize_full_game", |ben| {
        ben.iter(|| black_box(annotate::tokenize(black_box(&rec.movetext)).map(|t| t.len())))
    });
    c.bench_function("reproduce_full_game", |ben| {
        ben.iter(|| {
            let cmds = reproduce(black_box(&fen), black_box(&rec.movetext), &cfg);
            black_box(cmds.map(|c| c.searches.len()))
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
