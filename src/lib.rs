pub mod availability;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod requirements;
pub mod state;
pub mod stats;
pub mod telemetry;
