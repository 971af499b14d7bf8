//! Configuration types
//!
//! Board-agnostic bridge configuration. The host loads it from TOML; every
//! field has a default so partial files are accepted.

pub mod types;

pub use types::*;
