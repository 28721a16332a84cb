pub mod config;
pub mod exercise;
pub mod plan;
pub mod session;
pub mod stats;
