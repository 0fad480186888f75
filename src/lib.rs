//! Compares two takes of the same performance and reports acoustic indicators of voice
//! synthesis in the second one.

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod report;
pub mod types;
