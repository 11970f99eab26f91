pub mod example;
pub use example::*;

pub mod selfplay;
pub use selfplay::*;

pub mod trainer;
pub use trainer::*;
