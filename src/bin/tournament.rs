use anyhow::Context;
use autorps::arena::Metadata;
use autorps::arena::Ratings;
use autorps::arena::Tournament;
use autorps::nn::Nets;
use autorps::nn::Policy;
use autorps::players::Agent;
use autorps::players::Greedy;
use autorps::players::Minimax;
use autorps::players::Random;
use autorps::players::Searcher;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// round-robin evaluation: baselines against trained agents, elo
/// after every game, results to csv.
#[derive(Parser)]
#[command(version, about = "round-robin rating harness for the 3x3 placement game")]
struct Args {
    /// games per matchup
    #[arg(long, default_value_t = 20)]
    games: usize,
    /// prune agents rated under this; zero disables
    #[arg(long, default_value_t = 0.0)]
    cutoff: f64,
    /// leaderboard every n matchups; zero disables
    #[arg(long, default_value_t = 3)]
    interval: usize,
    /// search simulations per move for the mcts agent
    #[arg(long, default_value_t = autorps::SIMULATIONS)]
    simulations: usize,
    /// puct exploration constant
    #[arg(long, default_value_t = autorps::EXPLORATION)]
    exploration: f64,
    /// minimax lookahead depth
    #[arg(long, default_value_t = 3)]
    depth: usize,
    #[arg(long, default_value_t = autorps::DECK_SIZE)]
    deck_size: usize,
    #[arg(long, default_value_t = autorps::HAND_SIZE)]
    hand_size: usize,
    #[arg(long, default_value_t = autorps::MAX_ROUNDS)]
    max_rounds: usize,
    /// rng seed; omit for a wall-clock seed
    #[arg(long)]
    seed: Option<u64>,
    /// policy blob for the neural agents
    #[arg(long)]
    policy: Option<PathBuf>,
    /// value blob for the mcts agent
    #[arg(long)]
    value: Option<PathBuf>,
    /// result table destination
    #[arg(long, default_value = "tournament.csv")]
    output: PathBuf,
    /// persist elo state here as json
    #[arg(long)]
    ratings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    autorps::init();
    let args = Args::parse();
    if args.depth == 0 || args.simulations == 0 || args.hand_size == 0 || args.max_rounds == 0 {
        log::error!("sizes must be positive");
        std::process::exit(2);
    }
    if args.policy.is_some() != args.value.is_some() {
        log::error!("--policy and --value come as a pair");
        std::process::exit(2);
    }
    let seed = args.seed.unwrap_or_else(clock);
    let mut roster: Vec<Box<dyn Agent>> = vec![
        Box::new(Random::new(seed.wrapping_add(1))),
        Box::new(Minimax::new(args.depth)),
    ];
    let mut hidden = None;
    if let (Some(policy), Some(value)) = (&args.policy, &args.value) {
        let nets = Nets::load(policy, value).context("loading model blobs")?;
        hidden = Some(nets.hidden());
        roster.push(Box::new(Greedy::new(Policy::load(policy).context("loading policy blob")?)));
        roster.push(Box::new(Searcher::new(
            Arc::new(nets),
            args.simulations,
            args.exploration,
            seed.wrapping_add(2),
        )));
    }
    log::info!("{} agents, {} games per matchup", roster.len(), args.games);
    let mut tournament = Tournament::new(roster, args.games, args.cutoff, args.interval, seed)
        .rules(args.deck_size, args.hand_size, args.max_rounds);
    tournament.run();
    std::fs::write(&args.output, tournament.csv()).context("writing result table")?;
    log::info!("results written to {}", args.output.display());
    if let Some(path) = &args.ratings {
        let mut ratings = match path.exists() {
            true => Ratings::load(path).context("loading ratings file")?,
            false => Ratings::default(),
        };
        for game in tournament.ratings().match_history {
            ratings.log(game);
        }
        for entry in tournament.entries() {
            ratings
                .model_metadata
                .entry(entry.name.clone())
                .or_insert_with(|| Metadata {
                    name: entry.name.clone(),
                    description: "round-robin contestant".to_string(),
                    created: clock().to_string(),
                    hidden_size: hidden.unwrap_or(0),
                    ..Metadata::default()
                });
        }
        ratings.save(path).context("writing ratings file")?;
        log::info!("ratings written to {}", path.display());
    }
    print!("{}", tournament.csv());
    Ok(())
}

fn clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_nanos() as u64
}
