pub mod board_client;
pub mod wire;

pub use board_client::{ClientError, HttpBoardApi};
