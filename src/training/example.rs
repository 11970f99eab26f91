use crate::Features;
use crate::Probability;

/// one supervised tuple harvested from self-play: the position as
/// the mover saw it, the visit distribution the search produced
/// there, and how the game ended for that mover (1 win, 0 loss, 0.5
/// draw).
#[derive(Debug, Clone)]
pub struct Example {
    pub features: Features,
    pub pi: [Probability; crate::SLOTS],
    pub z: f64,
}
