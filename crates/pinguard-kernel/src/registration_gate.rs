//! [`RegistrationGate`] – the single entry point the request-handling layer
//! talks to.
//!
//! The gate owns the three engine components and exposes the boundary
//! operations:
//!
//! 1. [`RegistrationGate::get_or_create_binding`] – resolve (or create) the
//!    device's board binding. A different board model for an already bound
//!    device is a [`PinGuardError::BoardModelConflict`].
//! 2. [`RegistrationGate::validate_registration`] – resolve the board profile
//!    (unknown models fall back to the default) and run the
//!    [`CapabilityValidator`]. Pure: no state is read or written.
//! 3. [`RegistrationGate::register`] – both of the above in order, validating
//!    against the model the device is actually bound to.
//!
//! Mapping outcomes to transport responses is the caller's job.
//!
//! # Example
//!
//! ```
//! use pinguard_kernel::RegistrationGate;
//! use pinguard_types::{InterfaceRequest, PeripheralRole, RegistrationRequest};
//!
//! let gate = RegistrationGate::new();
//!
//! let bme280 = RegistrationRequest::new(
//!     "weather-1",
//!     21,
//!     PeripheralRole::Sensor,
//!     InterfaceRequest::I2c { i2c_address: 0x76 },
//! );
//! let outcome = gate.register("weather-1", "esp32", &bme280).unwrap();
//! assert!(outcome.is_accepted());
//!
//! // Same device, different board: refused before any validation.
//! assert!(gate.register("weather-1", "arduino-uno", &bme280).is_err());
//! ```

use pinguard_hal::BoardProfileRegistry;
use pinguard_types::{DeviceBinding, PinGuardError, RegistrationRequest, ValidationOutcome};
use tracing::{debug, warn};

use crate::device_registry::DeviceRegistry;
use crate::validator::CapabilityValidator;

/// Boundary between the engine and the surrounding service.
///
/// `Send + Sync`: share one gate between request handlers behind an `Arc`.
#[derive(Default)]
pub struct RegistrationGate {
    profiles: BoardProfileRegistry,
    validator: CapabilityValidator,
    devices: DeviceRegistry,
}

impl RegistrationGate {
    /// Gate with the built-in boards, rule chain and an empty device table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a gate from already-configured components.
    pub fn with_components(
        profiles: BoardProfileRegistry,
        validator: CapabilityValidator,
        devices: DeviceRegistry,
    ) -> Self {
        Self {
            profiles,
            validator,
            devices,
        }
    }

    /// Bind `device_id` to `board_model`, or return its existing binding.
    ///
    /// # Errors
    ///
    /// [`PinGuardError::BoardModelConflict`] if the device is bound to another model.
    pub fn get_or_create_binding(
        &self,
        device_id: &str,
        board_model: &str,
    ) -> Result<DeviceBinding, PinGuardError> {
        self.devices.register_or_get(device_id, board_model)
    }

    /// Validate `request` against the profile of `board_model`.
    pub fn validate_registration(
        &self,
        device_id: &str,
        board_model: &str,
        request: &RegistrationRequest,
    ) -> ValidationOutcome {
        if request.device_id != device_id {
            warn!(
                device_id,
                request_device_id = %request.device_id,
                "request device id differs from the device being validated"
            );
        }
        let profile = self.profiles.resolve(board_model);
        debug!(device_id, board = %profile.model(), pin = request.pin_number, "validating registration");
        self.validator.validate(profile, request)
    }

    /// Bind the device, then validate against its bound board model.
    ///
    /// # Errors
    ///
    /// [`PinGuardError::BoardModelConflict`] if the device is bound to another
    /// model; nothing is validated in that case.
    pub fn register(
        &self,
        device_id: &str,
        board_model: &str,
        request: &RegistrationRequest,
    ) -> Result<ValidationOutcome, PinGuardError> {
        let binding = self.get_or_create_binding(device_id, board_model)?;
        Ok(self.validate_registration(device_id, &binding.board_model, request))
    }

    pub fn profiles(&self) -> &BoardProfileRegistry {
        &self.profiles
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Rejection, Rule};
    use pinguard_types::{InterfaceRequest, PeripheralRole, PinCapability, RejectReason};

    fn digital(device: &str, pin: u16, role: PeripheralRole) -> RegistrationRequest {
        RegistrationRequest::new(device, pin, role, InterfaceRequest::Digital)
    }

    #[test]
    fn validate_uses_the_named_board() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 25, PeripheralRole::Actuator);
        assert_eq!(
            gate.validate_registration("dev-1", "esp8266-nodemcu", &r).reason(),
            Some(RejectReason::PinNotOnBoard)
        );
        assert!(gate.validate_registration("dev-1", "esp32-devkit", &r).is_accepted());
    }

    #[test]
    fn validate_unknown_board_uses_default_profile() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 32, PeripheralRole::Actuator);
        assert!(gate.validate_registration("dev-1", "prototype-rev-b", &r).is_accepted());
    }

    #[test]
    fn validate_does_not_create_bindings() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 4, PeripheralRole::Sensor);
        gate.validate_registration("dev-1", "uno", &r);
        assert!(gate.devices().is_empty());
    }

    #[test]
    fn register_binds_then_validates() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 34, PeripheralRole::Actuator);
        let outcome = gate.register("dev-1", "esp32", &r).unwrap();
        assert_eq!(outcome.reason(), Some(RejectReason::PinInputOnly));
        assert_eq!(gate.devices().get("dev-1").unwrap().board_model, "esp32-devkit");
    }

    #[test]
    fn register_conflict_skips_validation() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 4, PeripheralRole::Sensor);
        gate.register("dev-1", "nodemcu", &r).unwrap();
        let err = gate.register("dev-1", "esp32", &r).unwrap_err();
        assert!(matches!(err, PinGuardError::BoardModelConflict { ref bound, .. } if bound == "esp8266-nodemcu"));
    }

    #[test]
    fn register_is_idempotent() {
        let gate = RegistrationGate::new();
        let r = digital("dev-1", 22, PeripheralRole::Sensor);
        let first = gate.register("dev-1", "esp32", &r).unwrap();
        let second = gate.register("dev-1", "esp32", &r).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.reason(), Some(RejectReason::PinReservedForBus));
        assert_eq!(gate.devices().len(), 1);
    }

    /// Refuses GPIO0, a boot strapping pin, for actuators.
    struct NoStrappingActuator;

    impl Rule for NoStrappingActuator {
        fn name(&self) -> &str {
            "no_strapping_actuator"
        }

        fn check(&self, _pin: &PinCapability, request: &RegistrationRequest) -> Result<(), Rejection> {
            if request.pin_number == 0 && request.role == PeripheralRole::Actuator {
                return Err(Rejection::new(RejectReason::PinReservedForBus, "GPIO0 is a strapping pin"));
            }
            Ok(())
        }
    }

    #[test]
    fn custom_components_are_used_by_the_gate() {
        let mut validator = CapabilityValidator::new();
        validator.add_rule(Box::new(NoStrappingActuator));
        let gate = RegistrationGate::with_components(
            BoardProfileRegistry::new(),
            validator,
            DeviceRegistry::with_shards(1),
        );

        let relay = digital("dev-1", 0, PeripheralRole::Actuator);
        let outcome = gate.register("dev-1", "esp32", &relay).unwrap();
        assert_eq!(outcome.reason(), Some(RejectReason::PinReservedForBus));

        let button = digital("dev-1", 0, PeripheralRole::Sensor);
        assert!(gate.register("dev-1", "esp32", &button).unwrap().is_accepted());

        // The stock gate has no such rule.
        assert!(RegistrationGate::new().validate_registration("dev-1", "esp32", &relay).is_accepted());
    }
}
