use super::Agent;
use crate::game::Board;
use crate::game::Error;
use crate::game::Game;
use crate::game::Move;
use crate::game::Player;
use std::collections::HashMap;
use std::hash::Hash;
use std::hash::Hasher;

const WIN: i32 = 100_000;
const BOUND: i32 = 1_000_000;

/// classical alpha-beta over the same game model, for a baseline
/// that owes nothing to the networks. the static evaluation blends
/// material difference, central and corner control, and card-type
/// adjacency; leaf evaluations are memoized under a digest of the
/// position.
pub struct Minimax {
    depth: usize,
    table: HashMap<u64, i32>,
}

impl Minimax {
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "depthless search decides nothing");
        Self {
            depth,
            table: HashMap::new(),
        }
    }

    fn alpha_beta(&mut self, game: &Game, depth: usize, mut alpha: i32, mut beta: i32, me: Player) -> i32 {
        if game.is_over() {
            // deeper wins score lower so faster wins are preferred
            return match game.winner() {
                Player::None => 0,
                w if w == me => WIN + depth as i32,
                _ => -WIN - depth as i32,
            };
        }
        if depth == 0 {
            return self.score(game, me);
        }
        if game.turn() == me {
            let mut value = -BOUND;
            for m in game.valid_moves() {
                let child = game.apply(m).expect("generated moves are legal");
                value = value.max(self.alpha_beta(&child, depth - 1, alpha, beta, me));
                if value >= beta {
                    break;
                }
                alpha = alpha.max(value);
            }
            value
        } else {
            let mut value = BOUND;
            for m in game.valid_moves() {
                let child = game.apply(m).expect("generated moves are legal");
                value = value.min(self.alpha_beta(&child, depth - 1, alpha, beta, me));
                if value <= alpha {
                    break;
                }
                beta = beta.min(value);
            }
            value
        }
    }

    /// static evaluation from `me`'s side, memoized from the first
    /// player's side so both seats share the cache.
    fn score(&mut self, game: &Game, me: Player) -> i32 {
        let digest = Self::digest(game);
        let score = match self.table.get(&digest) {
            Some(&score) => score,
            None => {
                let score = Self::heuristic(game.board());
                self.table.insert(digest, score);
                score
            }
        };
        match me {
            Player::P1 => score,
            _ => -score,
        }
    }

    /// material difference dominates, placement weight (center over
    /// corners over edges) steers early play, and each owned card
    /// orthogonally adjacent to an enemy card it beats nudges the
    /// balance. positive favors the first player.
    fn heuristic(board: &Board) -> i32 {
        let mut score = 0;
        for slot in 0..crate::SLOTS {
            let square = board.at(slot);
            if square.is_empty() {
                continue;
            }
            let sign = match square.owner() {
                Player::P1 => 1,
                _ => -1,
            };
            score += sign * (100 + 10 * Self::placement(slot));
            for neighbor in Self::neighbors(slot) {
                let other = board.at(neighbor);
                if other.is_empty() || other.owner() == square.owner() {
                    continue;
                }
                if square.card().beats(&other.card()) {
                    score += sign * 5;
                }
            }
        }
        score
    }
    fn placement(slot: usize) -> i32 {
        match slot {
            4 => 3,
            0 | 2 | 6 | 8 => 2,
            _ => 1,
        }
    }
    fn neighbors(slot: usize) -> impl Iterator<Item = usize> {
        let (row, col) = (slot / crate::COLS, slot % crate::COLS);
        [(0, 1), (0, usize::MAX), (1, 0), (usize::MAX, 0)]
            .into_iter()
            .filter_map(move |(dr, dc)| {
                let r = row.wrapping_add(dr);
                let c = col.wrapping_add(dc);
                (r < crate::COLS && c < crate::COLS).then_some(r * crate::COLS + c)
            })
    }

    /// digest of (board, side to move, hand sizes), the memo key.
    fn digest(game: &Game) -> u64 {
        let mut hasher = std::hash::DefaultHasher::new();
        for slot in 0..crate::SLOTS {
            let square = game.board().at(slot);
            match square.is_empty() {
                true => 0u8.hash(&mut hasher),
                false => (1 + square.owner().index() as u8 * 3 + u8::from(square.card())).hash(&mut hasher),
            }
        }
        game.turn().index().hash(&mut hasher);
        game.hand(Player::P1).len().hash(&mut hasher);
        game.hand(Player::P2).len().hash(&mut hasher);
        hasher.finish()
    }
}

impl Agent for Minimax {
    fn name(&self) -> String {
        format!("minimax-{}", self.depth)
    }
    fn act(&mut self, game: &Game) -> Result<Move, Error> {
        let me = game.turn();
        let mut best: Option<(Move, i32)> = None;
        for m in game.valid_moves() {
            let child = game.apply(m).expect("generated moves are legal");
            let score = self.alpha_beta(&child, self.depth - 1, -BOUND, BOUND, me);
            if best.map(|(_, b)| score > b).unwrap_or(true) {
                best = Some((m, score));
            }
        }
        best.map(|(m, _)| m).ok_or(Error::NoValidMoves)
    }
}
