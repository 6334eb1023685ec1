//! [`CapabilityValidator`] – the accept/reject decision for a registration.
//!
//! The requested pin is first resolved against the board profile; a pin the
//! board does not expose is rejected with `pin_not_on_board`. The pin's
//! capability is then passed through every registered [`Rule`] in order and
//! the first violation becomes the outcome.
//!
//! The built-in chain, in evaluation order:
//! - [`I2cAddressRule`] – i2c requests must carry a usable 7-bit address.
//! - [`DirectionRule`] – actuators need an output-capable pin.
//! - [`DedicatedBusRule`] – bus-wired pins only accept the i2c interface.

use pinguard_hal::{BoardProfile, lookup};
use pinguard_types::{
    InterfaceRequest, InterfaceType, PeripheralRole, PinCapability, RegistrationRequest,
    RejectReason, ValidationOutcome,
};
use tracing::debug;

use crate::i2c::{AddressClass, classify};

/// A failed rule: the reason code plus a human readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub message: String,
}

impl Rejection {
    pub fn new(reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl From<Rejection> for ValidationOutcome {
    fn from(r: Rejection) -> Self {
        ValidationOutcome::rejected(r.reason, r.message)
    }
}

/// A single check applied to a resolved pin and the request targeting it.
///
/// Rules must be pure: the same inputs always produce the same result.
pub trait Rule: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    fn check(&self, pin: &PinCapability, request: &RegistrationRequest) -> Result<(), Rejection>;
}

// ────────────────────────────────────────────────────────────────────────────
// CapabilityValidator
// ────────────────────────────────────────────────────────────────────────────

/// Ordered rule chain deciding whether a request fits a board.
///
/// # Example
///
/// ```
/// use pinguard_hal::ESP32_DEVKIT;
/// use pinguard_kernel::CapabilityValidator;
/// use pinguard_types::{InterfaceRequest, PeripheralRole, RegistrationRequest};
///
/// let validator = CapabilityValidator::new();
///
/// let led = RegistrationRequest::new("dev", 4, PeripheralRole::Actuator, InterfaceRequest::Digital);
/// assert!(validator.validate(&ESP32_DEVKIT, &led).is_accepted());
///
/// let relay_on_adc = RegistrationRequest::new("dev", 34, PeripheralRole::Actuator, InterfaceRequest::Digital);
/// assert_eq!(validator.validate(&ESP32_DEVKIT, &relay_on_adc).reason_code(), Some("pin_input_only"));
/// ```
pub struct CapabilityValidator {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for CapabilityValidator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(I2cAddressRule),
                Box::new(DirectionRule),
                Box::new(DedicatedBusRule),
            ],
        }
    }
}

impl CapabilityValidator {
    /// Validator with the built-in rule chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; it runs after every rule registered before it.
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn validate(&self, profile: &BoardProfile, request: &RegistrationRequest) -> ValidationOutcome {
        let pin = match lookup(profile, request.pin_number) {
            Ok(pin) => pin,
            Err(e) => {
                debug!(device_id = %request.device_id, pin = request.pin_number, "pin not on board");
                return ValidationOutcome::rejected(RejectReason::PinNotOnBoard, e.to_string());
            }
        };
        for rule in &self.rules {
            if let Err(rejection) = rule.check(&pin, request) {
                debug!(
                    device_id = %request.device_id,
                    pin = request.pin_number,
                    rule = rule.name(),
                    reason = rejection.reason.code(),
                    "registration rejected"
                );
                return rejection.into();
            }
        }
        debug!(device_id = %request.device_id, pin = request.pin_number, "registration accepted");
        ValidationOutcome::Accepted
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rules
// ────────────────────────────────────────────────────────────────────────────

/// Rejects i2c requests whose address is not a usable 7-bit target address.
pub struct I2cAddressRule;

impl Rule for I2cAddressRule {
    fn name(&self) -> &str {
        "i2c_address"
    }

    fn check(&self, _pin: &PinCapability, request: &RegistrationRequest) -> Result<(), Rejection> {
        if let InterfaceRequest::I2c { i2c_address } = request.interface
            && let AddressClass::Invalid(fault) = classify(i2c_address)
        {
            return Err(Rejection::new(
                fault.into(),
                format!("I2C address {i2c_address} is {fault}"),
            ));
        }
        Ok(())
    }
}

/// Rejects actuators on pins that cannot drive an output.
///
/// Sensors are never restricted here; an output-capable pin can still be read.
pub struct DirectionRule;

impl Rule for DirectionRule {
    fn name(&self) -> &str {
        "direction"
    }

    fn check(&self, pin: &PinCapability, request: &RegistrationRequest) -> Result<(), Rejection> {
        if request.role == PeripheralRole::Actuator && !pin.can_be_output() {
            return Err(Rejection::new(
                RejectReason::PinInputOnly,
                format!("GPIO{} is input-only and cannot drive an actuator", request.pin_number),
            ));
        }
        Ok(())
    }
}

/// Rejects non-i2c use of pins wired to an onboard bus signal.
///
/// The converse is allowed: any pin without a dedicated role may carry a
/// software i2c bus.
pub struct DedicatedBusRule;

impl Rule for DedicatedBusRule {
    fn name(&self) -> &str {
        "dedicated_bus"
    }

    fn check(&self, pin: &PinCapability, request: &RegistrationRequest) -> Result<(), Rejection> {
        if pin.is_bus_dedicated() && request.interface_type() != InterfaceType::I2c {
            return Err(Rejection::new(
                RejectReason::PinReservedForBus,
                format!(
                    "GPIO{} is wired to {} and cannot be used as {}",
                    request.pin_number,
                    pin.dedicated_bus_role(),
                    request.interface_type()
                ),
            ));
        }
        Ok(())
    }
}
