use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use othmatch::board::PassCode;
use othmatch::matcher::{Corpus, CorpusBuilder, MatcherConfig, SymmetryMatcher};
use othmatch::position::Position;
use othmatch::square::Square;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// ランダム対局による棋譜集
fn random_corpus(n_games: usize, seed: u64) -> (Corpus, Vec<Vec<i8>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = CorpusBuilder::with_capacity(n_games);
    let mut all_codes = Vec::with_capacity(n_games);
    for _ in 0..n_games {
        let mut pos = Position::new();
        let mut codes = Vec::new();
        loop {
            let (moves, code) = pos.calc_moves_and_pass();
            if code == PassCode::GameOver {
                break;
            }
            let choice = rng.random_range(0..moves.count_ones() as usize);
            let sq = pos.legal_moves().nth(choice).unwrap();
            pos.make_move(sq).unwrap();
            codes.push(sq.index() as i8);
        }
        builder
            .push_codes(&codes, pos.n_black() as u8, 2000, 0)
            .unwrap();
        all_codes.push(codes);
    }
    (builder.build(), all_codes)
}

fn target_at(codes: &[i8], ply: usize) -> Position {
    let mut pos = Position::new();
    for &code in &codes[..ply] {
        if pos.calc_moves() == 0 {
            pos.pass();
        }
        let sq = Square::new(code as u8).unwrap();
        pos.make_move(sq).unwrap();
    }
    pos
}

/// 照合手数ごとの全件走査
fn bench_find_matches_by_ply(c: &mut Criterion) {
    let (corpus, codes) = random_corpus(10_000, 1);
    let mut group = c.benchmark_group("find_matches_by_ply");
    group.sample_size(20);

    for ply in [4usize, 12, 30] {
        let target = target_at(&codes[0], ply);
        let matcher = SymmetryMatcher::new(&target, MatcherConfig::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("ply", ply), &matcher, |b, m| {
            b.iter(|| black_box(m.find_matches(black_box(&corpus)).unwrap()))
        });
    }

    group.finish();
}

/// スレッド数ごとの走査
fn bench_find_matches_threads(c: &mut Criterion) {
    let (corpus, codes) = random_corpus(10_000, 2);
    let target = target_at(&codes[0], 8);
    let mut group = c.benchmark_group("find_matches_threads");
    group.sample_size(20);

    for threads in [1usize, 2, 4] {
        let config = MatcherConfig {
            num_threads: threads,
            ..Default::default()
        };
        let matcher = SymmetryMatcher::new(&target, config).unwrap();
        group.bench_with_input(BenchmarkId::new("threads", threads), &matcher, |b, m| {
            b.iter(|| black_box(m.find_matches(black_box(&corpus)).unwrap()))
        });
    }

    group.finish();
}

/// 統計集計を含む問い合わせ
fn bench_query(c: &mut Criterion) {
    let (corpus, _) = random_corpus(10_000, 3);
    let matcher = SymmetryMatcher::new(&Position::new(), MatcherConfig::default()).unwrap();

    let mut group = c.benchmark_group("query");
    group.sample_size(20);
    group.bench_function("start_position", |b| {
        b.iter(|| black_box(matcher.query(black_box(&corpus)).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_find_matches_by_ply,
    bench_find_matches_threads,
    bench_query
);
criterion_main!(benches);
