use super::player::Player;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0} moved out of turn")]
    InvalidPlayer(Player),
    #[error("slot {0} is not open")]
    OccupiedSlot(usize),
    #[error("card index {0} is out of range")]
    InvalidCardIndex(usize),
    #[error("no valid moves")]
    NoValidMoves,
}
