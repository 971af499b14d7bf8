//! Heron Hardware Abstraction Layer
//!
//! This crate defines the byte channel traits the protocol codec is written
//! against. The host bridge implements them on top of a serial port; a
//! microcontroller port would implement them on its UART peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  heron-protocol (frame codec)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  heron-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ serial port   │       │ in-memory     │
//! │ (heron-bridge)│       │ mock          │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{Uart, UartConfig, UartRx, UartTx};
