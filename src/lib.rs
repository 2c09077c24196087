pub mod app;
pub mod client;
pub mod strategy;
pub mod execution;
pub mod storage;
pub mod monitoring;
pub mod utils;
pub mod validation;
pub mod types;

pub use crate::types::*;
