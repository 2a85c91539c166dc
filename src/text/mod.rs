pub mod block;
pub mod engine;
pub mod wrap;
