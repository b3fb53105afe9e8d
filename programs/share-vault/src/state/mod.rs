pub mod user_shares;
pub mod vault;

pub use user_shares::*;
pub use vault::*;
