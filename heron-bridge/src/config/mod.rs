//! Configuration loading
//!
//! Reads `BridgeConfig` from a TOML file, falling back to the embedded
//! heron.toml, then applies command line overrides.

mod loader;

pub use loader::{load_config, parse_config, Overrides, EMBEDDED_CONFIG};
