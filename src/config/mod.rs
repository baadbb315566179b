//! Configuration
//!
//! Environment-sourced settings with optional TOML file support.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::Config;
