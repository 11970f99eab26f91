use super::Agent;
use crate::game::Error;
use crate::game::Game;
use crate::game::Move;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// uniform over legal moves. the floor every trained agent must beat.
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Agent for Random {
    fn name(&self) -> String {
        "random".to_string()
    }
    fn act(&mut self, game: &Game) -> Result<Move, Error> {
        game.random_move(&mut self.rng)
    }
}
