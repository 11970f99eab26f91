use super::player::Player;

/// one placement: the mover's hand index and the target slot. both
/// are validated when the move is applied, not when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub index: usize,
    pub slot: usize,
    pub player: Player,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} card {} -> slot {}", self.player, self.index, self.slot)
    }
}
