pub mod deposit;
pub mod initialize_vault;
pub mod queries;
pub mod redeem;
pub mod withdraw;
pub mod withdraw_all;

pub use deposit::*;
pub use initialize_vault::*;
pub use queries::*;
pub use redeem::*;
pub use withdraw::*;
pub use withdraw_all::*;
