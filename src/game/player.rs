/// a seat at the table. None doubles as the owner of an empty square
/// and as the verdict of a drawn game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
    None,
}

impl Player {
    pub fn opponent(&self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
            Player::None => Player::None,
        }
    }
    pub fn index(&self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
            Player::None => panic!("no seat for the empty player"),
        }
    }
    pub fn is_none(&self) -> bool {
        matches!(self, Player::None)
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Player::P1 => write!(f, "P1"),
            Player::P2 => write!(f, "P2"),
            Player::None => write!(f, "--"),
        }
    }
}

impl crate::Arbitrary for Player {
    fn random() -> Self {
        match rand::random_range(0..2u8) {
            0 => Player::P1,
            _ => Player::P2,
        }
    }
}
