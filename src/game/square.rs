use super::card::Card;
use super::player::Player;

/// one cell of the board. the owner decides emptiness: a square whose
/// owner is None is empty no matter what its card bits say.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    card: Card,
    owner: Player,
}

impl Square {
    pub fn empty() -> Self {
        Self {
            card: Card::Rock,
            owner: Player::None,
        }
    }
    pub fn take(card: Card, owner: Player) -> Self {
        assert!(!owner.is_none(), "placed squares have an owner");
        Self { card, owner }
    }
    pub fn card(&self) -> Card {
        self.card
    }
    pub fn owner(&self) -> Player {
        self.owner
    }
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.owner {
            Player::None => write!(f, "."),
            Player::P1 => write!(f, "{}", self.card.letter()),
            Player::P2 => write!(f, "{}", self.card.letter().to_ascii_lowercase()),
        }
    }
}
