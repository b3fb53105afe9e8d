pub mod position;
pub mod reserve;

pub use position::*;
pub use reserve::*;
