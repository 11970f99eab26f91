use crate::game::Error;
use crate::game::Game;
use crate::game::Move;

/// the uniform contract every contestant speaks. an agent that
/// errors out of `act` forfeits that game in tournament play.
pub trait Agent {
    fn name(&self) -> String;
    fn act(&mut self, game: &Game) -> Result<Move, Error>;
}

pub mod greedy;
pub use greedy::*;

pub mod minimax;
pub use minimax::*;

pub mod random;
pub use random::*;

pub mod searcher;
pub use searcher::*;
