pub mod block;

pub use block::{Block, MAX_DIFFICULTY};
