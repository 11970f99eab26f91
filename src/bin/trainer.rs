use anyhow::Context;
use autorps::nn::Nets;
use autorps::nn::Oracle;
use autorps::training::SelfPlay;
use autorps::training::Trainer;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;

/// self-play training: harvest games with search, fit both heads,
/// save the blobs, repeat.
#[derive(Parser)]
#[command(version, about = "self-play trainer for the 3x3 placement game")]
struct Args {
    /// games harvested per iteration
    #[arg(long, default_value_t = 64)]
    games: usize,
    /// harvest-then-fit cycles
    #[arg(long, default_value_t = 4)]
    iterations: usize,
    /// hidden width for freshly initialized heads
    #[arg(long, default_value_t = autorps::HIDDEN)]
    hidden: usize,
    /// search simulations per move
    #[arg(long, default_value_t = autorps::SIMULATIONS)]
    simulations: usize,
    /// puct exploration constant
    #[arg(long, default_value_t = autorps::EXPLORATION)]
    exploration: f64,
    /// leaves per batched evaluation; zero stays synchronous
    #[arg(long, default_value_t = 0)]
    leaf_batch: usize,
    #[arg(long, default_value_t = autorps::DECK_SIZE)]
    deck_size: usize,
    #[arg(long, default_value_t = autorps::HAND_SIZE)]
    hand_size: usize,
    #[arg(long, default_value_t = autorps::MAX_ROUNDS)]
    max_rounds: usize,
    #[arg(long, default_value_t = 10)]
    epochs: usize,
    #[arg(long, default_value_t = autorps::BATCH_SIZE)]
    batch_size: usize,
    #[arg(long, default_value_t = autorps::LEARNING_RATE)]
    learning_rate: f64,
    /// rng seed; omit for a wall-clock seed
    #[arg(long)]
    seed: Option<u64>,
    /// policy blob, resumed from when present
    #[arg(long, default_value = "policy.json")]
    policy: PathBuf,
    /// value blob, resumed from when present
    #[arg(long, default_value = "value.json")]
    value: PathBuf,
}

fn main() -> anyhow::Result<()> {
    autorps::init();
    let args = Args::parse();
    if args.hidden == 0 || args.hand_size == 0 || args.max_rounds == 0 || args.batch_size == 0 {
        log::error!("sizes must be positive");
        std::process::exit(2);
    }
    let seed = args.seed.unwrap_or_else(clock);
    let mut rng = SmallRng::seed_from_u64(seed);
    let nets = match args.policy.exists() && args.value.exists() {
        true => {
            log::info!("resuming from {} and {}", args.policy.display(), args.value.display());
            Nets::load(&args.policy, &args.value).context("loading model blobs")?
        }
        false => {
            log::info!("fresh heads at hidden width {}", args.hidden);
            Nets::new(args.hidden, &mut rng)
        }
    };
    let trainer = Trainer::new(args.epochs, args.batch_size, args.learning_rate);
    for iteration in 1..=args.iterations {
        log::info!("iteration {} of {}", iteration, args.iterations);
        let selfplay = SelfPlay {
            games: args.games,
            simulations: args.simulations,
            exploration: args.exploration,
            leaf_batch: args.leaf_batch,
            deck_size: args.deck_size,
            hand_size: args.hand_size,
            max_rounds: args.max_rounds,
            seed: seed.wrapping_add(iteration as u64),
        };
        let mut examples = selfplay.run(&nets);
        log::info!("harvested {} examples ({})", examples.len(), nets.stats());
        trainer.fit(&nets, &mut examples, &mut rng);
        nets.save(&args.policy, &args.value).context("saving model blobs")?;
        log::info!("saved {} and {}", args.policy.display(), args.value.display());
    }
    Ok(())
}

fn clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_nanos() as u64
}
