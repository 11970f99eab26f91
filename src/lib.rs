pub mod arena;
pub mod game;
pub mod mcts;
pub mod nn;
pub mod players;
pub mod training;

/// dimensional analysis types
pub type Probability = f64;
pub type Utility = f64;

/// the 81-float input the networks consume. nine floats per board
/// slot: indices 0..2 one-hot the card type for the first player,
/// 3..5 for the second, 6..8 are reserved and stay zero.
pub type Features = [f64; ENCODING];

// board geometry
pub const COLS: usize = 3;
pub const SLOTS: usize = COLS * COLS;
pub const ENCODING: usize = SLOTS * SLOTS;

// table rules
pub const DECK_SIZE: usize = 21;
pub const HAND_SIZE: usize = 5;
pub const MAX_ROUNDS: usize = 10;

// network parameters
pub const HIDDEN: usize = 128;
pub const LEARNING_RATE: f64 = 0.01;
pub const BATCH_SIZE: usize = 32;
pub const GRADIENT_CLIP: f64 = 1.0;
pub const UPDATE_CLIP: f64 = 0.1;
pub const LOSS_SENTINEL: f64 = 100.0;
pub const PROBABILITY_FLOOR: f64 = 1e-15;
pub const LOGIT_LIMIT: f64 = 20.0;

// search parameters
pub const SIMULATIONS: usize = 400;
pub const EXPLORATION: f64 = 1.5;
pub const LEAF_BATCH: usize = 8;
pub const VIRTUAL_LOSS: f64 = 1.0;
pub const BATCH_WAIT: std::time::Duration = std::time::Duration::from_millis(5);

// rating parameters
pub const ELO_BASE: f64 = 1500.0;
pub const ELO_K: f64 = 32.0;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(1);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize logging to terminal and a timestamped file
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
