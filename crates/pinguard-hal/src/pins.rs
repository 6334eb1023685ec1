//! Pin capability lookup against a resolved [`BoardProfile`].

use pinguard_types::PinCapability;
use thiserror::Error;

use crate::board::{BoardModel, BoardProfile};

/// The board does not expose the requested pin.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("GPIO{pin_number} is not exposed by board '{model}'")]
pub struct PinNotFound {
    pub model: BoardModel,
    pub pin_number: u16,
}

/// Return the capability record of `pin_number` on `profile`.
///
/// # Errors
///
/// Returns [`PinNotFound`] when the profile has no such pin. A missing pin is
/// never replaced by a default capability.
///
/// # Example
///
/// ```
/// use pinguard_hal::{lookup, ESP32_DEVKIT, ESP8266_NODEMCU};
///
/// assert!(lookup(&ESP32_DEVKIT, 34).unwrap().is_input_only());
/// assert!(lookup(&ESP8266_NODEMCU, 34).is_err());
/// ```
pub fn lookup(profile: &BoardProfile, pin_number: u16) -> Result<PinCapability, PinNotFound> {
    profile.find(pin_number).ok_or(PinNotFound {
        model: profile.model(),
        pin_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ARDUINO_UNO, ESP32_DEVKIT, ESP8266_NODEMCU};
    use pinguard_types::BusRole;

    #[test]
    fn lookup_returns_capability_for_known_pin() {
        let cap = lookup(&ESP32_DEVKIT, 4).unwrap();
        assert!(cap.can_be_input());
        assert!(cap.can_be_output());
        assert_eq!(cap.dedicated_bus_role(), BusRole::None);
    }

    #[test]
    fn lookup_missing_pin_reports_board_and_pin() {
        let err = lookup(&ESP8266_NODEMCU, 25).unwrap_err();
        assert_eq!(err.model, BoardModel::Esp8266Nodemcu);
        assert_eq!(err.pin_number, 25);
        assert!(err.to_string().contains("GPIO25"));
    }

    #[test]
    fn lookup_gap_in_pin_table_is_not_found() {
        // GPIO 6–11 drive the SPI flash and are not broken out.
        for pin in 6..=11 {
            assert!(lookup(&ESP32_DEVKIT, pin).is_err());
        }
        assert!(lookup(&ESP32_DEVKIT, 24).is_err());
    }

    #[test]
    fn lookup_beyond_table_is_not_found() {
        assert!(lookup(&ARDUINO_UNO, 20).is_err());
        assert!(lookup(&ARDUINO_UNO, u16::MAX).is_err());
    }

    #[test]
    fn lookup_is_pure() {
        assert_eq!(lookup(&ARDUINO_UNO, 18), lookup(&ARDUINO_UNO, 18));
        assert_eq!(lookup(&ARDUINO_UNO, 18).unwrap().dedicated_bus_role(), BusRole::I2cSda);
    }
}
