use super::example::Example;
use crate::game::Game;
use crate::game::Player;
use crate::mcts::Search;
use crate::nn::Oracle;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

/// plays both sides of training games with the shared oracle and
/// harvests supervised tuples. games are independent, so they fan
/// out across the thread pool, each with its own tree and rng
/// derived from the base seed and the game index.
pub struct SelfPlay {
    pub games: usize,
    pub simulations: usize,
    pub exploration: f64,
    /// leaves per batched evaluation; zero keeps leaf calls
    /// synchronous
    pub leaf_batch: usize,
    pub deck_size: usize,
    pub hand_size: usize,
    pub max_rounds: usize,
    pub seed: u64,
}

impl SelfPlay {
    pub fn new(games: usize, simulations: usize, exploration: f64, seed: u64) -> Self {
        Self {
            games,
            simulations,
            exploration,
            leaf_batch: 0,
            deck_size: crate::DECK_SIZE,
            hand_size: crate::HAND_SIZE,
            max_rounds: crate::MAX_ROUNDS,
            seed,
        }
    }

    pub fn run(&self, oracle: &dyn Oracle) -> Vec<Example> {
        let progress = crate::progress(self.games);
        let examples = (0..self.games)
            .into_par_iter()
            .flat_map_iter(|index| {
                let examples = self.game(oracle, index);
                progress.inc(1);
                examples
            })
            .collect();
        progress.finish();
        examples
    }

    /// one full game: record (position, visit target, mover) before
    /// every move, then stamp each record with the outcome from its
    /// mover's side.
    fn game(&self, oracle: &dyn Oracle, index: usize) -> Vec<Example> {
        let mut rng = self.rng(index, 0);
        let search = Search::new(self.simulations, self.exploration, self.rng(index, 1))
            .with_batch(self.leaf_batch);
        let mut game = Game::new(self.deck_size, self.hand_size, self.max_rounds, &mut rng);
        let mut steps: Vec<(crate::Features, [f64; crate::SLOTS], Player)> = Vec::new();
        while !game.is_over() {
            let tree = search.explore(oracle, &game);
            let m = match tree.best() {
                Some(m) => m,
                None => game.random_move(&mut rng).expect("open game has moves"),
            };
            steps.push((game.features(), tree.pi(), game.turn()));
            game = game.apply(m).expect("search returns a legal move");
        }
        let winner = game.winner();
        steps
            .into_iter()
            .map(|(features, pi, mover)| Example {
                features,
                pi,
                z: Self::score(winner, mover),
            })
            .collect()
    }

    fn score(winner: Player, mover: Player) -> f64 {
        match winner {
            Player::None => 0.5,
            w if w == mover => 1.0,
            _ => 0.0,
        }
    }

    /// split the base seed per game and per consumer so parallel
    /// games never share a stream.
    fn rng(&self, index: usize, lane: u64) -> SmallRng {
        let salt = (index as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15);
        SmallRng::seed_from_u64(self.seed ^ salt ^ (lane << 32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::Nets;

    #[test]
    fn harvested_examples_are_well_formed() {
        let nets = Nets::new(8, &mut SmallRng::seed_from_u64(70));
        let selfplay = SelfPlay::new(2, 20, 1.0, 71);
        let examples = selfplay.run(&nets);
        assert!(!examples.is_empty());
        for example in examples.iter() {
            assert!(example.features.len() == crate::ENCODING);
            assert!(example.pi.len() == crate::SLOTS);
            assert!((example.pi.iter().sum::<f64>() - 1.0).abs() < 1e-6);
            assert!([0.0, 0.5, 1.0].contains(&example.z));
        }
    }

    #[test]
    fn outcomes_within_one_game_are_consistent() {
        let nets = Nets::new(8, &mut SmallRng::seed_from_u64(72));
        let selfplay = SelfPlay::new(1, 10, 1.0, 73);
        let examples = selfplay.run(&nets);
        // alternating movers: if anyone won, winners and losers
        // alternate plies; draws mark every ply 0.5
        match examples[0].z {
            0.5 => assert!(examples.iter().all(|e| e.z == 0.5)),
            first => examples
                .iter()
                .enumerate()
                .for_each(|(i, e)| match i % 2 {
                    0 => assert!(e.z == first),
                    _ => assert!(e.z == 1.0 - first),
                }),
        }
    }

    #[test]
    fn batched_leaf_evaluation_harvests_the_same_shape() {
        let nets = Nets::new(8, &mut SmallRng::seed_from_u64(76));
        let mut selfplay = SelfPlay::new(1, 16, 1.0, 77);
        selfplay.leaf_batch = 4;
        let examples = selfplay.run(&nets);
        assert!(!examples.is_empty());
        for example in examples.iter() {
            assert!((example.pi.iter().sum::<f64>() - 1.0).abs() < 1e-6);
            assert!([0.0, 0.5, 1.0].contains(&example.z));
        }
    }

    #[test]
    fn the_same_seed_reproduces_the_harvest() {
        let nets = Nets::new(8, &mut SmallRng::seed_from_u64(74));
        let selfplay = SelfPlay::new(1, 15, 1.0, 75);
        let a = selfplay.run(&nets);
        let b = selfplay.run(&nets);
        assert!(a.len() == b.len());
        assert!(a.iter().zip(&b).all(|(a, b)| a.features == b.features && a.z == b.z));
    }
}
