use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Onboard bus signal a pin is permanently wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BusRole {
    #[default]
    None,
    I2cSda,
    I2cScl,
}

impl fmt::Display for BusRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusRole::None => write!(f, "none"),
            BusRole::I2cSda => write!(f, "i2c_sda"),
            BusRole::I2cScl => write!(f, "i2c_scl"),
        }
    }
}

/// Electrical capability of a single physical pin.
///
/// Only constructible through the `const` constructors below, which keep
/// bus-dedicated pins readable and input-only pins non-driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinCapability {
    can_be_input: bool,
    can_be_output: bool,
    dedicated_bus_role: BusRole,
}

impl PinCapability {
    /// General purpose pin that can both read and drive.
    pub const fn bidirectional() -> Self {
        Self {
            can_be_input: true,
            can_be_output: true,
            dedicated_bus_role: BusRole::None,
        }
    }

    /// Pin that can only be read (e.g. ADC-only pins).
    pub const fn input_only() -> Self {
        Self {
            can_be_input: true,
            can_be_output: false,
            dedicated_bus_role: BusRole::None,
        }
    }

    /// Pin hard-wired to an onboard bus signal.
    pub const fn bus(role: BusRole) -> Self {
        Self {
            can_be_input: true,
            can_be_output: true,
            dedicated_bus_role: role,
        }
    }

    pub fn can_be_input(&self) -> bool {
        self.can_be_input
    }

    pub fn can_be_output(&self) -> bool {
        self.can_be_output
    }

    pub fn dedicated_bus_role(&self) -> BusRole {
        self.dedicated_bus_role
    }

    pub fn is_input_only(&self) -> bool {
        self.can_be_input && !self.can_be_output
    }

    pub fn is_bus_dedicated(&self) -> bool {
        self.dedicated_bus_role != BusRole::None
    }
}

/// What a peripheral does with its pin. Sensors only read, actuators only write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralRole {
    Sensor,
    Actuator,
}

impl fmt::Display for PeripheralRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeripheralRole::Sensor => write!(f, "sensor"),
            PeripheralRole::Actuator => write!(f, "actuator"),
        }
    }
}

impl FromStr for PeripheralRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sensor" => Ok(Self::Sensor),
            "actuator" => Ok(Self::Actuator),
            _ => Err(format!("unknown peripheral role: {s:?}")),
        }
    }
}

/// Electrical interface a peripheral is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    Digital,
    Analog,
    I2c,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceType::Digital => write!(f, "digital"),
            InterfaceType::Analog => write!(f, "analog"),
            InterfaceType::I2c => write!(f, "i2c"),
        }
    }
}

impl FromStr for InterfaceType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digital" => Ok(Self::Digital),
            "analog" => Ok(Self::Analog),
            "i2c" => Ok(Self::I2c),
            _ => Err(format!("unknown interface type: {s:?}")),
        }
    }
}

/// Interface selection with the bus address carried only where it applies.
///
/// On the wire this is flattened into the request as `interface_type` plus an
/// `i2c_address` field that only exists for `"i2c"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "interface_type", rename_all = "snake_case")]
pub enum InterfaceRequest {
    Digital,
    Analog,
    I2c { i2c_address: i16 },
}

impl InterfaceRequest {
    pub fn interface_type(&self) -> InterfaceType {
        match self {
            InterfaceRequest::Digital => InterfaceType::Digital,
            InterfaceRequest::Analog => InterfaceType::Analog,
            InterfaceRequest::I2c { .. } => InterfaceType::I2c,
        }
    }

    pub fn i2c_address(&self) -> Option<i16> {
        match self {
            InterfaceRequest::I2c { i2c_address } => Some(*i2c_address),
            _ => None,
        }
    }
}

/// A request to attach one peripheral to one pin of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationRequest {
    pub device_id: String,
    pub pin_number: u16,
    pub role: PeripheralRole,
    #[serde(flatten)]
    pub interface: InterfaceRequest,
}

impl RegistrationRequest {
    pub fn new(
        device_id: impl Into<String>,
        pin_number: u16,
        role: PeripheralRole,
        interface: InterfaceRequest,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            pin_number,
            role,
            interface,
        }
    }

    /// Build a request from the flat form used by loosely typed callers, where
    /// the address travels as an independent optional field.
    ///
    /// # Errors
    ///
    /// - [`RejectReason::I2cAddressMissing`] – `i2c` without an address.
    /// - [`RejectReason::I2cAddressUnexpected`] – an address on a non-i2c interface.
    pub fn from_parts(
        device_id: impl Into<String>,
        pin_number: u16,
        role: PeripheralRole,
        interface_type: InterfaceType,
        i2c_address: Option<i16>,
    ) -> Result<Self, RejectReason> {
        let interface = match (interface_type, i2c_address) {
            (InterfaceType::I2c, Some(i2c_address)) => InterfaceRequest::I2c { i2c_address },
            (InterfaceType::I2c, None) => return Err(RejectReason::I2cAddressMissing),
            (_, Some(_)) => return Err(RejectReason::I2cAddressUnexpected),
            (InterfaceType::Digital, None) => InterfaceRequest::Digital,
            (InterfaceType::Analog, None) => InterfaceRequest::Analog,
        };
        Ok(Self::new(device_id, pin_number, role, interface))
    }

    pub fn interface_type(&self) -> InterfaceType {
        self.interface.interface_type()
    }
}

/// Why a registration request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    PinNotOnBoard,
    PinInputOnly,
    PinReservedForBus,
    I2cAddressMissing,
    I2cAddressUnexpected,
    I2cAddressNegative,
    I2cAddressReservedGeneralCall,
    I2cAddressReservedExtended,
    I2cAddressOutOfRange,
}

impl RejectReason {
    /// Stable machine-readable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::PinNotOnBoard => "pin_not_on_board",
            RejectReason::PinInputOnly => "pin_input_only",
            RejectReason::PinReservedForBus => "pin_reserved_for_bus",
            RejectReason::I2cAddressMissing => "i2c_address_missing",
            RejectReason::I2cAddressUnexpected => "i2c_address_unexpected",
            RejectReason::I2cAddressNegative => "i2c_address_negative",
            RejectReason::I2cAddressReservedGeneralCall => "i2c_address_reserved_general_call",
            RejectReason::I2cAddressReservedExtended => "i2c_address_reserved_extended",
            RejectReason::I2cAddressOutOfRange => "i2c_address_out_of_range",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Final decision for a single registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted,
    Rejected { reason: RejectReason, message: String },
}

impl ValidationOutcome {
    pub fn rejected(reason: RejectReason, message: impl Into<String>) -> Self {
        ValidationOutcome::Rejected {
            reason,
            message: message.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            ValidationOutcome::Accepted => None,
            ValidationOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        self.reason().map(|r| r.code())
    }
}

/// Association between a device and the board model it was first registered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceBinding {
    pub device_id: String,
    /// Normalized board model string (see `pinguard_hal::normalize_model`).
    pub board_model: String,
    pub bound_at: DateTime<Utc>,
}

/// Errors that cross the engine boundary as `Err` rather than as a
/// [`ValidationOutcome`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinGuardError {
    #[error("Board Model Conflict: device '{device_id}' is bound to '{bound}', not '{requested}'")]
    BoardModelConflict {
        device_id: String,
        bound: String,
        requested: String,
    },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Manifest Error: {0}")]
    Manifest(String),
}

impl PinGuardError {
    pub fn code(&self) -> &'static str {
        match self {
            PinGuardError::BoardModelConflict { .. } => "board_model_conflict",
            PinGuardError::Config(_) => "config_error",
            PinGuardError::Manifest(_) => "manifest_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_pins_are_readable() {
        let sda = PinCapability::bus(BusRole::I2cSda);
        assert!(sda.can_be_input());
        assert!(sda.is_bus_dedicated());
        assert_eq!(sda.dedicated_bus_role(), BusRole::I2cSda);
    }

    #[test]
    fn input_only_pin_cannot_drive() {
        let adc = PinCapability::input_only();
        assert!(adc.is_input_only());
        assert!(!adc.can_be_output());
        assert!(!adc.is_bus_dedicated());
    }

    #[test]
    fn i2c_request_wire_shape() {
        let req = RegistrationRequest::new(
            "dev-1",
            21,
            PeripheralRole::Sensor,
            InterfaceRequest::I2c { i2c_address: 0x40 },
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["interface_type"], "i2c");
        assert_eq!(json["i2c_address"], 0x40);
        assert_eq!(json["role"], "sensor");

        let back: RegistrationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn digital_request_has_no_address_field() {
        let req = RegistrationRequest::new("dev-1", 4, PeripheralRole::Actuator, InterfaceRequest::Digital);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["interface_type"], "digital");
        assert!(json.get("i2c_address").is_none());
    }

    #[test]
    fn i2c_request_without_address_fails_to_deserialize() {
        let raw = r#"{"device_id":"d","pin_number":21,"role":"sensor","interface_type":"i2c"}"#;
        assert!(serde_json::from_str::<RegistrationRequest>(raw).is_err());
    }

    #[test]
    fn from_parts_requires_address_for_i2c() {
        let result = RegistrationRequest::from_parts(
            "dev-1",
            21,
            PeripheralRole::Sensor,
            InterfaceType::I2c,
            None,
        );
        assert_eq!(result, Err(RejectReason::I2cAddressMissing));
    }

    #[test]
    fn from_parts_rejects_address_on_digital() {
        let result = RegistrationRequest::from_parts(
            "dev-1",
            4,
            PeripheralRole::Sensor,
            InterfaceType::Digital,
            Some(0x20),
        );
        assert_eq!(result, Err(RejectReason::I2cAddressUnexpected));
    }

    #[test]
    fn from_parts_builds_analog_request() {
        let req = RegistrationRequest::from_parts(
            "dev-1",
            34,
            PeripheralRole::Sensor,
            InterfaceType::Analog,
            None,
        )
        .unwrap();
        assert_eq!(req.interface_type(), InterfaceType::Analog);
        assert_eq!(req.interface.i2c_address(), None);
    }

    #[test]
    fn reject_reason_codes_match_serde_names() {
        for reason in [
            RejectReason::PinNotOnBoard,
            RejectReason::PinInputOnly,
            RejectReason::PinReservedForBus,
            RejectReason::I2cAddressMissing,
            RejectReason::I2cAddressNegative,
            RejectReason::I2cAddressReservedGeneralCall,
            RejectReason::I2cAddressReservedExtended,
            RejectReason::I2cAddressOutOfRange,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn rejected_outcome_serializes_with_reason_code() {
        let outcome = ValidationOutcome::rejected(RejectReason::PinInputOnly, "GPIO34 is input-only");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "pin_input_only");
        assert_eq!(outcome.reason_code(), Some("pin_input_only"));
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn role_and_interface_parse_case_insensitively() {
        assert_eq!("Actuator".parse::<PeripheralRole>(), Ok(PeripheralRole::Actuator));
        assert_eq!(" I2C ".parse::<InterfaceType>(), Ok(InterfaceType::I2c));
        assert!("pwm".parse::<InterfaceType>().is_err());
    }

    #[test]
    fn conflict_error_display_and_code() {
        let err = PinGuardError::BoardModelConflict {
            device_id: "dev-1".into(),
            bound: "esp32-devkit".into(),
            requested: "arduino-uno".into(),
        };
        assert_eq!(err.code(), "board_model_conflict");
        assert!(err.to_string().contains("dev-1"));
        assert!(err.to_string().contains("arduino-uno"));
    }
}
