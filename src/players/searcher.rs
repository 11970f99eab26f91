use super::Agent;
use crate::game::Error;
use crate::game::Game;
use crate::game::Move;
use crate::mcts::Search;
use crate::nn::Oracle;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

/// the full self-play agent: network-guided puct search, one fresh
/// tree per move.
pub struct Searcher {
    oracle: Arc<dyn Oracle>,
    search: Search,
}

impl Searcher {
    pub fn new(oracle: Arc<dyn Oracle>, simulations: usize, exploration: f64, seed: u64) -> Self {
        Self {
            oracle,
            search: Search::new(simulations, exploration, SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Agent for Searcher {
    fn name(&self) -> String {
        format!("mcts-{}", self.search.simulations)
    }
    fn act(&mut self, game: &Game) -> Result<Move, Error> {
        self.search.decide(self.oracle.as_ref(), game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::Nets;

    #[test]
    fn searcher_plays_legal_moves_to_completion() {
        let mut rng = SmallRng::seed_from_u64(91);
        let oracle = Arc::new(Nets::new(8, &mut rng));
        let mut searcher = Searcher::new(oracle, 25, 1.0, 92);
        let mut game = Game::root(&mut rng);
        while !game.is_over() {
            let m = searcher.act(&game).unwrap();
            assert!(game.valid_moves().contains(&m));
            game = game.apply(m).unwrap();
        }
    }
}
