//! Library crate for proxy-scan-rs exposing reusable modules.
pub mod config;
pub mod engine;
pub mod ports;
pub mod probe;
pub mod targets;
pub mod types;
