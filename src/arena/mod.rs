pub mod elo;
pub use elo::*;

pub mod ratings;
pub use ratings::*;

pub mod record;
pub use record::*;

pub mod tournament;
pub use tournament::*;
