//! `pinguard-hal` – Board Data
//!
//! Static reference data describing the boards PinGuard can validate against.
//!
//! # Modules
//!
//! - [`board`] – [`BoardModel`][board::BoardModel] and the immutable pin tables
//!   of every [`BoardProfile`][board::BoardProfile].
//! - [`registry`] – [`BoardProfileRegistry`][registry::BoardProfileRegistry]:
//!   resolves a model string to a profile, falling back to the default board.
//! - [`pins`] – [`lookup`][pins::lookup]: per-pin capability lookup that reports
//!   [`PinNotFound`][pins::PinNotFound] for pins a board does not expose.

pub mod board;
pub mod pins;
pub mod registry;

pub use board::{
    ARDUINO_UNO, BoardModel, BoardProfile, ESP32_DEVKIT, ESP8266_NODEMCU, normalize_model,
};
pub use pins::{PinNotFound, lookup};
pub use registry::{BoardProfileRegistry, DEFAULT_MODEL};
