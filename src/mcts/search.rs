use super::tree::Tree;
use crate::game::Error;
use crate::game::Game;
use crate::game::Move;
use crate::game::Player;
use crate::nn;
use crate::nn::Oracle;
use crate::Probability;
use crate::Utility;
use rand::rngs::SmallRng;
use std::time::Instant;

/// puct search over the placement game. one instance owns its rng
/// and rebuilds a fresh tree for every root it is asked about.
///
/// with a nonzero batch size, non-terminal leaves queue for one
/// batched prior call and one batched value call instead of paying
/// per-leaf latency. the queue flushes when full or after a bounded
/// wait, and earlier if selection cannot progress without it.
pub struct Search {
    pub simulations: usize,
    pub exploration: f64,
    pub batch: usize,
    pub deadline: Option<Instant>,
    rng: SmallRng,
}

impl Search {
    pub fn new(simulations: usize, exploration: f64, rng: SmallRng) -> Self {
        Self {
            simulations,
            exploration,
            batch: 0,
            deadline: None,
            rng,
        }
    }
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// grow a tree from the root state: the configured number of
    /// simulations, cut short only at simulation boundaries by the
    /// deadline. no in-flight batch outlives this call.
    pub fn explore(&self, oracle: &dyn Oracle, root: &Game) -> Tree {
        let mut tree = Tree::seed(root.clone());
        match self.batch {
            0 => self.singles(oracle, &mut tree),
            _ => self.batched(oracle, &mut tree),
        }
        tree
    }

    /// the recommended move. a search cancelled before any root
    /// child was visited falls back to a random legal move.
    pub fn decide(&mut self, oracle: &dyn Oracle, root: &Game) -> Result<Move, Error> {
        let tree = self.explore(oracle, root);
        match tree.best() {
            Some(m) => Ok(m),
            None => root.random_move(&mut self.rng),
        }
    }

    fn singles(&self, oracle: &dyn Oracle, tree: &mut Tree) {
        for _ in 0..self.simulations {
            if self.expired() {
                break;
            }
            let leaf = tree.select(self.exploration);
            let v = Self::evaluate(oracle, tree, leaf);
            tree.backpropagate(leaf, v);
        }
    }

    fn batched(&self, oracle: &dyn Oracle, tree: &mut Tree) {
        let mut pending: Vec<usize> = Vec::with_capacity(self.batch);
        let mut since = Instant::now();
        for _ in 0..self.simulations {
            if self.expired() {
                break;
            }
            let leaf = tree.select(self.exploration);
            if tree.at(leaf).game().is_over() {
                let v = Self::outcome(tree.at(leaf).game());
                tree.backpropagate(leaf, v);
                continue;
            }
            if pending.contains(&leaf) {
                // selection is stuck behind the assembling batch;
                // flush it and forfeit this simulation
                Self::flush(oracle, tree, &mut pending);
                since = Instant::now();
                continue;
            }
            tree.reserve(leaf, 1);
            pending.push(leaf);
            if pending.len() >= self.batch || since.elapsed() >= crate::BATCH_WAIT {
                Self::flush(oracle, tree, &mut pending);
                since = Instant::now();
            }
        }
        Self::flush(oracle, tree, &mut pending);
    }

    fn flush(oracle: &dyn Oracle, tree: &mut Tree, pending: &mut Vec<usize>) {
        if pending.is_empty() {
            return;
        }
        for &leaf in pending.iter() {
            tree.reserve(leaf, -1);
        }
        let xs: Vec<crate::Features> = pending.iter().map(|&l| tree.at(l).game().features()).collect();
        // a failed batch degrades to per-leaf calls; those carry
        // their own uniform-prior / drawn-value fallbacks
        let priors: Vec<Result<[Probability; crate::SLOTS], nn::Error>> = match oracle.priors_batch(&xs) {
            Ok(ps) => ps.into_iter().map(Ok).collect(),
            Err(e) => {
                log::warn!("batched priors failed, retrying per leaf: {}", e);
                xs.iter().map(|x| oracle.priors(x)).collect()
            }
        };
        let values: Vec<Result<f64, nn::Error>> = match oracle.leaf_batch(&xs) {
            Ok(vs) => vs.into_iter().map(Ok).collect(),
            Err(e) => {
                log::warn!("batched values failed, retrying per leaf: {}", e);
                xs.iter().map(|x| oracle.leaf(x)).collect()
            }
        };
        for ((leaf, prior), value) in pending.drain(..).zip(priors).zip(values) {
            let v = Self::remap(value);
            Self::expand(tree, leaf, prior);
            tree.backpropagate(leaf, v);
        }
    }

    /// evaluate one leaf synchronously, expanding it when the game
    /// is still open. neither head failing aborts the search.
    fn evaluate(oracle: &dyn Oracle, tree: &mut Tree, leaf: usize) -> Utility {
        if tree.at(leaf).game().is_over() {
            return Self::outcome(tree.at(leaf).game());
        }
        let x = tree.at(leaf).game().features();
        let v = Self::remap(oracle.leaf(&x));
        let priors = oracle.priors(&x);
        Self::expand(tree, leaf, priors);
        v
    }

    /// attach one child per legal move, in move order. every child
    /// takes the raw prior of its target slot; siblings sharing a
    /// slot share a prior and are told apart by visit statistics.
    fn expand(
        tree: &mut Tree,
        leaf: usize,
        priors: Result<[Probability; crate::SLOTS], nn::Error>,
    ) {
        let moves = tree.at(leaf).game().valid_moves();
        if moves.is_empty() {
            return;
        }
        let priors: Vec<Probability> = match priors {
            Ok(p) => moves.iter().map(|m| p[m.slot]).collect(),
            Err(e) => {
                log::warn!("prior estimate failed, substituting uniform: {}", e);
                vec![1.0 / moves.len() as f64; moves.len()]
            }
        };
        for (m, prior) in moves.into_iter().zip(priors) {
            let child = tree.at(leaf).game().apply(m).expect("generated moves are legal");
            tree.grow(leaf, child, m, prior);
        }
    }

    /// terminal leaves score from the game itself, never the heads:
    /// +1 / 0 / -1 from the perspective of the player to move.
    fn outcome(game: &Game) -> Utility {
        match game.winner() {
            Player::None => 0.0,
            w if w == game.turn() => 1.0,
            _ => -1.0,
        }
    }

    /// the value head answers in [0, 1]; backprop wants [-1, 1]. a
    /// failed estimate backs up a draw.
    fn remap(value: Result<f64, nn::Error>) -> Utility {
        match value {
            Ok(v) => 2.0 * v - 1.0,
            Err(e) => {
                log::warn!("value estimate failed, backing up a draw: {}", e);
                0.0
            }
        }
    }

    fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::Nets;
    use crate::nn::Stats;
    use rand::SeedableRng;

    /// an oracle whose every answer is an error, for fallback paths.
    struct Refusenik;
    impl Oracle for Refusenik {
        fn priors(&self, _: &crate::Features) -> Result<[Probability; crate::SLOTS], nn::Error> {
            Err(nn::Error::Unavailable)
        }
        fn priors_batch(&self, _: &[crate::Features]) -> Result<Vec<[Probability; crate::SLOTS]>, nn::Error> {
            Err(nn::Error::Unavailable)
        }
        fn leaf(&self, _: &crate::Features) -> Result<f64, nn::Error> {
            Err(nn::Error::Unavailable)
        }
        fn leaf_batch(&self, _: &[crate::Features]) -> Result<Vec<f64>, nn::Error> {
            Err(nn::Error::Unavailable)
        }
        fn stats(&self) -> Stats {
            Stats::default()
        }
    }

    fn nets(seed: u64) -> Nets {
        Nets::new(8, &mut SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn fifty_simulations_shape() {
        let mut rng = SmallRng::seed_from_u64(50);
        let game = Game::root(&mut rng);
        let nets = nets(51);
        let search = Search::new(50, 1.0, SmallRng::seed_from_u64(52));
        let tree = search.explore(&nets, &game);
        assert!(tree.root().visits() == 50);
        let children: Vec<_> = tree.root().children().to_vec();
        let total: usize = children.iter().map(|&c| tree.at(c).visits()).sum();
        assert!(total == 49);
        assert!(children
            .iter()
            .all(|&c| (0.0..=1.0).contains(&tree.at(c).prior())));
        let most = children.iter().map(|&c| tree.at(c).visits()).max().unwrap();
        let best = tree.best().unwrap();
        assert!(children
            .iter()
            .filter(|&&c| tree.at(c).visits() == most)
            .any(|&c| tree.at(c).edge().unwrap() == best));
    }

    #[test]
    fn batched_search_accounts_every_simulation() {
        let mut rng = SmallRng::seed_from_u64(53);
        let game = Game::root(&mut rng);
        let nets = nets(54);
        let search = Search::new(40, 1.5, SmallRng::seed_from_u64(55)).with_batch(8);
        let tree = search.explore(&nets, &game);
        // forfeited simulations are allowed but virtual losses must
        // all have been reverted
        assert!(tree.root().visits() <= 40);
        assert!(tree.root().visits() > 0);
        let total: usize = tree.root().children().iter().map(|&c| tree.at(c).visits()).sum();
        assert!(total == tree.root().visits() - 1);
        assert!(nets.stats().batches > 0);
    }

    #[test]
    fn an_unavailable_oracle_still_yields_a_legal_move() {
        let mut rng = SmallRng::seed_from_u64(56);
        let game = Game::root(&mut rng);
        let mut search = Search::new(30, 1.0, SmallRng::seed_from_u64(57));
        let m = search.decide(&Refusenik, &game).unwrap();
        assert!(game.valid_moves().contains(&m));
        // uniform priors across a fresh root
        let tree = search.explore(&Refusenik, &game);
        let first = tree.root().children()[0];
        let n = game.valid_moves().len() as f64;
        assert!((tree.at(first).prior() - 1.0 / n).abs() < 1e-12);
    }

    #[test]
    fn a_cancelled_search_falls_back_to_a_random_legal_move() {
        let mut rng = SmallRng::seed_from_u64(58);
        let game = Game::root(&mut rng);
        let nets = nets(59);
        let mut search =
            Search::new(400, 1.0, SmallRng::seed_from_u64(60)).with_deadline(Instant::now());
        let m = search.decide(&nets, &game).unwrap();
        assert!(game.valid_moves().contains(&m));
    }

    #[test]
    fn terminal_roots_report_no_valid_moves() {
        let mut game = Game::new(21, 1, 10, &mut SmallRng::seed_from_u64(61));
        let mut rng = SmallRng::seed_from_u64(62);
        while !game.is_over() {
            game = game.apply(game.random_move(&mut rng).unwrap()).unwrap();
        }
        let nets = nets(63);
        let mut search = Search::new(10, 1.0, SmallRng::seed_from_u64(64));
        assert!(search.decide(&nets, &game) == Err(Error::NoValidMoves));
    }
}
