pub mod init;
pub mod replay;
pub mod verify;

pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
pub use verify::{verify, VerifyArgs};
