pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Ports (traits the pipeline depends on) and their infrastructure adapters
pub mod app;
pub mod infra;
