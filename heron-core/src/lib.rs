//! Board-agnostic core logic for the Heron sensor bridge
//!
//! This crate contains everything between a decoded frame and a published
//! distance that does not depend on the host:
//!
//! - Sensor variants and their calibration tables
//! - Reading extraction and distance correction
//! - Per-node sensor state
//! - Bridge configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod sensor;
