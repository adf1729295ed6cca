//! Trace-driven simulator for `policy-cache`.
//!
//! Generates synthetic request logs and replays them through every eviction
//! policy so their hit rates and per-operation latency can be compared.

pub mod generator;
pub mod input;
pub mod models;
pub mod runner;
pub mod stats;
