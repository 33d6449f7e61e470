//! Adapter implementations
//!
//! - In-memory repository backed by a JSON working file
//! - Id generators (uuid for production, sequential for tests)
//! - Demo data set for trying the CLI without real data

pub mod demo;
pub mod ids;
pub mod memory;
