use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use othmatch::move_set::MoveSet;
use othmatch::position::Position;
use othmatch::square::Square;

fn sq(name: &str) -> Square {
    Square::from_name(name).unwrap()
}

/// 初期局面での着手
fn bench_make_move_initial(c: &mut Criterion) {
    let pos = Position::new();
    let first = pos.legal_moves().next().unwrap();

    c.bench_function("make_move_initial", |b| {
        b.iter(|| {
            let mut copy = black_box(pos);
            black_box(copy.make_move(black_box(first)))
        })
    });
}

/// make_move + undo_move
fn bench_make_undo_roundtrip(c: &mut Criterion) {
    let pos = Position::new();
    let first = pos.legal_moves().next().unwrap();

    c.bench_function("make_undo_roundtrip", |b| {
        b.iter(|| {
            let mut copy = black_box(pos);
            let undo = copy.make_move(black_box(first)).unwrap();
            copy.undo_move(black_box(undo));
            black_box(copy)
        })
    });
}

/// 反転方向ごとの着手
fn bench_make_move_flip_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move_flip_types");
    let pos = Position::new();

    for (label, name) in [("vertical", "d3"), ("horizontal", "c4")] {
        group.bench_with_input(BenchmarkId::new("flip", label), &sq(name), |b, &mv| {
            b.iter(|| {
                let mut copy = black_box(pos);
                black_box(copy.make_move(black_box(mv)))
            })
        });
    }

    group.finish();
}

/// 非合法手の拒否
fn bench_make_move_errors(c: &mut Criterion) {
    let pos = Position::new();
    let mut group = c.benchmark_group("make_move_errors");

    group.bench_function("no_flips", |b| {
        b.iter(|| {
            let mut copy = black_box(pos);
            black_box(copy.make_move(black_box(sq("a1"))))
        })
    });

    group.bench_function("occupied", |b| {
        b.iter(|| {
            let mut copy = black_box(pos);
            black_box(copy.make_move(black_box(sq("d4"))))
        })
    });

    group.finish();
}

/// 順序付き合法手カーソルの全列挙
fn bench_move_set_iteration(c: &mut Criterion) {
    let mut pos = Position::new();
    for name in ["f5", "d6", "c3", "d3", "c4"] {
        pos.make_move(sq(name)).unwrap();
    }
    let board = *pos.board();

    c.bench_function("move_set_iterate", |b| {
        b.iter(|| black_box(MoveSet::new(black_box(&board)).count()))
    });
}

criterion_group!(
    benches,
    bench_make_move_initial,
    bench_make_undo_roundtrip,
    bench_make_move_flip_types,
    bench_make_move_errors,
    bench_move_set_iteration
);
criterion_main!(benches);
