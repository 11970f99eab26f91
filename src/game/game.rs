use super::action::Move;
use super::board::Board;
use super::error::Error;
use super::hand::Hand;
use super::player::Player;
use crate::Features;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

/// full state of one placement game in between moves.
///
/// the state is immutable by copy: `apply` validates and returns the
/// child state, leaving the parent untouched. search leans on this
/// clone being cheap (a nine-square board and two short hands).
///
/// rounds are 1-based and tick over after the second player moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    board: Board,
    hands: [Hand; 2],
    turn: Player,
    round: usize,
    deck_size: usize,
    hand_size: usize,
    max_rounds: usize,
}

impl Game {
    pub fn new(deck_size: usize, hand_size: usize, max_rounds: usize, rng: &mut SmallRng) -> Self {
        Self {
            board: Board::empty(),
            hands: [Hand::deal(hand_size, rng), Hand::deal(hand_size, rng)],
            turn: Player::P1,
            round: 1,
            deck_size,
            hand_size,
            max_rounds,
        }
    }
    /// a fresh game under default table rules
    pub fn root(rng: &mut SmallRng) -> Self {
        Self::new(crate::DECK_SIZE, crate::HAND_SIZE, crate::MAX_ROUNDS, rng)
    }

    //
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn turn(&self) -> Player {
        self.turn
    }
    pub fn round(&self) -> usize {
        self.round
    }
    pub fn hand(&self, player: Player) -> &Hand {
        &self.hands[player.index()]
    }
    pub fn deck_size(&self) -> usize {
        self.deck_size
    }
    pub fn hand_size(&self) -> usize {
        self.hand_size
    }
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// every legal placement for the side to move: the cartesian
    /// product of hand indices (outer) and open slots (inner). the
    /// ordering is observable; expansion maps the i-th legal move
    /// onto the i-th consumed prior.
    pub fn valid_moves(&self) -> Vec<Move> {
        let hand = self.hand(self.turn);
        let slots = self.board.vacancies();
        let mut moves = Vec::with_capacity(hand.len() * slots.len());
        for index in 0..hand.len() {
            for slot in slots.iter().copied() {
                moves.push(Move {
                    index,
                    slot,
                    player: self.turn,
                });
            }
        }
        moves
    }

    /// validate and play one placement, returning the child state.
    pub fn apply(&self, m: Move) -> Result<Self, Error> {
        if m.player != self.turn {
            return Err(Error::InvalidPlayer(m.player));
        }
        if m.index >= self.hand(self.turn).len() {
            return Err(Error::InvalidCardIndex(m.index));
        }
        if m.slot >= crate::SLOTS || !self.board.at(m.slot).is_empty() {
            return Err(Error::OccupiedSlot(m.slot));
        }
        let mut child = self.clone();
        let card = child.hands[self.turn.index()].remove(m.index);
        child.board.place(m.slot, card, self.turn);
        child.turn = self.turn.opponent();
        if child.turn == Player::P1 {
            child.round += 1;
        }
        Ok(child)
    }

    pub fn is_over(&self) -> bool {
        self.is_board_full() || self.is_hand_exhausted() || self.is_round_limit()
    }

    /// the player owning strictly more squares; ties are None.
    pub fn winner(&self) -> Player {
        let one = self.board.count(Player::P1);
        let two = self.board.count(Player::P2);
        if one > two {
            Player::P1
        } else if two > one {
            Player::P2
        } else {
            Player::None
        }
    }

    /// encode the board for the networks. each owned square lights
    /// exactly one of its nine entries; empty squares stay all-zero.
    pub fn features(&self) -> Features {
        let mut encoding = [0.0; crate::ENCODING];
        for slot in 0..crate::SLOTS {
            let square = self.board.at(slot);
            if !square.is_empty() {
                let group = slot * crate::SLOTS;
                let offset = square.owner().index() * 3 + u8::from(square.card()) as usize;
                encoding[group + offset] = 1.0;
            }
        }
        encoding
    }

    pub fn random_move(&self, rng: &mut SmallRng) -> Result<Move, Error> {
        self.valid_moves()
            .choose(rng)
            .copied()
            .ok_or(Error::NoValidMoves)
    }

    //
    fn is_board_full(&self) -> bool {
        self.board.is_full()
    }
    fn is_hand_exhausted(&self) -> bool {
        self.hand(self.turn).is_empty()
    }
    fn is_round_limit(&self) -> bool {
        self.round > self.max_rounds
    }
}

impl From<&Game> for String {
    fn from(game: &Game) -> Self {
        format!(
            "P1[{}] P2[{}] {} to move, round {}/{}",
            game.hands[0], game.hands[1], game.turn, game.round, game.max_rounds
        )
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{}", String::from(self))
    }
}

impl crate::Arbitrary for Game {
    fn random() -> Self {
        use rand::SeedableRng;
        let mut rng = SmallRng::from_os_rng();
        let mut game = Self::root(&mut rng);
        for _ in 0..rand::random_range(0..6) {
            if game.is_over() {
                break;
            }
            let m = game.random_move(&mut rng).expect("open game has moves");
            game = game.apply(m).expect("random move is legal");
        }
        game
    }
}
