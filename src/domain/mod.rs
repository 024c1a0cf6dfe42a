pub mod bet;
pub mod money;

pub use bet::*;
pub use money::*;
