//! A dataset that is kept entirely in memory.
mod storage;

pub use storage::MemQuadStorage;
