// HTTP routes
pub mod health;
pub mod matching;
pub mod participants;

pub use health::*;
pub use matching::*;
pub use participants::*;
