//! `pinguard-kernel` – Decision Engine
//!
//! Decides whether a peripheral may be wired to a pin of a given board, and
//! keeps track of which board each device was registered with.
//!
//! # Modules
//!
//! - [`i2c`] – [`classify`][i2c::classify]: sorts a candidate 7-bit I2C address
//!   into valid, negative, or one of the reserved/out-of-range classes.
//! - [`validator`] – [`CapabilityValidator`][validator::CapabilityValidator]:
//!   resolves the requested pin and runs an ordered chain of
//!   [`Rule`][validator::Rule]s; the first violation becomes the outcome.
//! - [`device_registry`] – [`DeviceRegistry`][device_registry::DeviceRegistry]:
//!   sharded device-id → board-model table with idempotent registration and
//!   conflict detection.
//! - [`registration_gate`] – [`RegistrationGate`][registration_gate::RegistrationGate]:
//!   the boundary used by the request-handling layer.

pub mod device_registry;
pub mod i2c;
pub mod registration_gate;
pub mod validator;

pub use device_registry::DeviceRegistry;
pub use i2c::{AddressClass, AddressFault, classify};
pub use registration_gate::RegistrationGate;
pub use validator::{
    CapabilityValidator, DedicatedBusRule, DirectionRule, I2cAddressRule, Rejection, Rule,
};
