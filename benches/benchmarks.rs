use autorps::game::Game;
use autorps::mcts::Search;
use autorps::nn::Nets;
use autorps::nn::Oracle;
use rand::SeedableRng;
use rand::rngs::SmallRng;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        generating_moves,
        encoding_features,
        forwarding_a_batch,
        searching_a_fresh_game,
        searching_a_fresh_game_batched,
}

fn generating_moves(c: &mut criterion::Criterion) {
    let game = Game::root(&mut SmallRng::seed_from_u64(1));
    c.bench_function("generate all legal moves", |b| b.iter(|| game.valid_moves()));
}

fn encoding_features(c: &mut criterion::Criterion) {
    let game = Game::root(&mut SmallRng::seed_from_u64(2));
    c.bench_function("encode a position", |b| b.iter(|| game.features()));
}

fn forwarding_a_batch(c: &mut criterion::Criterion) {
    let mut rng = SmallRng::seed_from_u64(3);
    let nets = Nets::new(autorps::HIDDEN, &mut rng);
    let xs: Vec<autorps::Features> = (0..32).map(|_| Game::root(&mut rng).features()).collect();
    c.bench_function("batched policy forward (32)", |b| {
        b.iter(|| nets.priors_batch(&xs).unwrap())
    });
}

fn searching_a_fresh_game(c: &mut criterion::Criterion) {
    let mut rng = SmallRng::seed_from_u64(4);
    let nets = Nets::new(32, &mut rng);
    let game = Game::root(&mut rng);
    c.bench_function("100 simulations from the root", |b| {
        b.iter(|| {
            let search = Search::new(100, autorps::EXPLORATION, SmallRng::seed_from_u64(5));
            search.explore(&nets, &game)
        })
    });
}

fn searching_a_fresh_game_batched(c: &mut criterion::Criterion) {
    let mut rng = SmallRng::seed_from_u64(6);
    let nets = Nets::new(32, &mut rng);
    let game = Game::root(&mut rng);
    c.bench_function("100 simulations from the root, batched leaves", |b| {
        b.iter(|| {
            let search = Search::new(100, autorps::EXPLORATION, SmallRng::seed_from_u64(7))
                .with_batch(autorps::LEAF_BATCH);
            search.explore(&nets, &game)
        })
    });
}
