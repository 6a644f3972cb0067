//! Contains storage layer implementations that resolve quad patterns against a dataset.

pub mod memory;
