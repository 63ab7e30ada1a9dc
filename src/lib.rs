// src/lib.rs - Library interface for internal module access

pub mod aggregation;
pub mod colorscale;
pub mod config;
pub mod constants;
pub mod data_input;
pub mod error;
pub mod export;
pub mod font_config;
pub mod geo;
pub mod metrics;
pub mod plot_framework;

pub use error::{GlobeError, Result};

/// Package version from Cargo.toml, shown by `--version`.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
