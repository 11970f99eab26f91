use super::Agent;
use crate::game::Error;
use crate::game::Game;
use crate::game::Move;
use crate::nn::Policy;

/// plays the policy head's argmax over legal slots, no search. ties
/// go to the earliest move in generation order.
pub struct Greedy {
    policy: Policy,
}

impl Greedy {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }
}

impl Agent for Greedy {
    fn name(&self) -> String {
        format!("greedy-h{}", self.policy.hidden())
    }
    fn act(&mut self, game: &Game) -> Result<Move, Error> {
        let p = self.policy.predict(&game.features());
        let mut best: Option<(Move, f64)> = None;
        for m in game.valid_moves() {
            let weight = p[m.slot];
            if best.map(|(_, w)| weight > w).unwrap_or(true) {
                best = Some((m, weight));
            }
        }
        best.map(|(m, _)| m).ok_or(Error::NoValidMoves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn picks_a_legal_move_on_the_preferred_slot() {
        let mut rng = SmallRng::seed_from_u64(90);
        let mut greedy = Greedy::new(Policy::new(8, &mut rng));
        let game = Game::root(&mut rng);
        let m = greedy.act(&game).unwrap();
        assert!(game.valid_moves().contains(&m));
        let p = greedy.policy.predict(&game.features());
        let top = p.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(p[m.slot] == top);
        // earliest move wins the tie, so the card index is zero
        assert!(m.index == 0);
    }
}
