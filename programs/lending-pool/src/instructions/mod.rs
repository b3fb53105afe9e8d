pub mod init_position;
pub mod init_reserve;
pub mod supply;
pub mod withdraw;

pub use init_position::*;
pub use init_reserve::*;
pub use supply::*;
pub use withdraw::*;
