//! Static board data: the closed set of supported [`BoardModel`]s and the pin
//! table of each [`BoardProfile`].
//!
//! Adding a board is a data change: add a variant, its aliases, and a pin
//! table below, then list it in [`BoardModel::ALL`].

use std::fmt;
use std::str::FromStr;

use pinguard_types::{BusRole, PinCapability};

/// Every board model this build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardModel {
    Esp32Devkit,
    Esp8266Nodemcu,
    ArduinoUno,
}

impl BoardModel {
    pub const ALL: [BoardModel; 3] = [
        BoardModel::Esp32Devkit,
        BoardModel::Esp8266Nodemcu,
        BoardModel::ArduinoUno,
    ];

    /// Canonical model identifier, e.g. `"esp32-devkit"`.
    pub fn id(&self) -> &'static str {
        match self {
            BoardModel::Esp32Devkit => "esp32-devkit",
            BoardModel::Esp8266Nodemcu => "esp8266-nodemcu",
            BoardModel::ArduinoUno => "arduino-uno",
        }
    }

    pub fn profile(&self) -> &'static BoardProfile {
        match self {
            BoardModel::Esp32Devkit => &ESP32_DEVKIT,
            BoardModel::Esp8266Nodemcu => &ESP8266_NODEMCU,
            BoardModel::ArduinoUno => &ARDUINO_UNO,
        }
    }
}

impl fmt::Display for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BoardModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esp32-devkit" | "esp32" | "esp32dev" | "esp32-devkitc" => Ok(Self::Esp32Devkit),
            "esp8266-nodemcu" | "esp8266" | "nodemcu" => Ok(Self::Esp8266Nodemcu),
            "arduino-uno" | "uno" | "arduino" => Ok(Self::ArduinoUno),
            _ => Err(format!("unknown board model: {s:?}")),
        }
    }
}

/// Normalize a caller-supplied model string for storage and comparison.
///
/// Known aliases collapse to the canonical id; anything else is trimmed and
/// lowercased so that unknown models still compare stably.
pub fn normalize_model(raw: &str) -> String {
    match raw.parse::<BoardModel>() {
        Ok(model) => model.id().to_string(),
        Err(_) => raw.trim().to_ascii_lowercase(),
    }
}

/// Immutable description of the pins a board exposes.
#[derive(Debug, PartialEq, Eq)]
pub struct BoardProfile {
    model: BoardModel,
    /// Sorted by pin number, no duplicates.
    pins: &'static [(u16, PinCapability)],
}

impl BoardProfile {
    pub fn model(&self) -> BoardModel {
        self.model
    }

    pub fn pins(&self) -> &'static [(u16, PinCapability)] {
        self.pins
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub(crate) fn find(&self, pin_number: u16) -> Option<PinCapability> {
        self.pins
            .binary_search_by_key(&pin_number, |(n, _)| *n)
            .ok()
            .map(|idx| self.pins[idx].1)
    }
}

const IO: PinCapability = PinCapability::bidirectional();
const IN: PinCapability = PinCapability::input_only();
const SDA: PinCapability = PinCapability::bus(BusRole::I2cSda);
const SCL: PinCapability = PinCapability::bus(BusRole::I2cScl);

/// ESP32-DevKitC (WROOM-32): the 26 GPIOs broken out on the headers.
/// 34, 35, 36 (VP) and 39 (VN) are input-only; 21/22 are wired to I2C.
pub static ESP32_DEVKIT: BoardProfile = BoardProfile {
    model: BoardModel::Esp32Devkit,
    pins: &[
        (0, IO),
        (1, IO),
        (2, IO),
        (3, IO),
        (4, IO),
        (5, IO),
        (12, IO),
        (13, IO),
        (14, IO),
        (15, IO),
        (16, IO),
        (17, IO),
        (18, IO),
        (19, IO),
        (21, SDA),
        (22, SCL),
        (23, IO),
        (25, IO),
        (26, IO),
        (27, IO),
        (32, IO),
        (33, IO),
        (34, IN),
        (35, IN),
        (36, IN),
        (39, IN),
    ],
};

/// NodeMCU (ESP8266): GPIO 0–5 and 12–16, A0 exposed as pin 17.
/// I2C is bit-banged, so no pin is bus-dedicated.
pub static ESP8266_NODEMCU: BoardProfile = BoardProfile {
    model: BoardModel::Esp8266Nodemcu,
    pins: &[
        (0, IO),
        (1, IO),
        (2, IO),
        (3, IO),
        (4, IO),
        (5, IO),
        (12, IO),
        (13, IO),
        (14, IO),
        (15, IO),
        (16, IO),
        (17, IN),
    ],
};

/// Arduino Uno: D0–D13, A0–A3 as 14–17, A4/A5 (18/19) shared with TWI.
pub static ARDUINO_UNO: BoardProfile = BoardProfile {
    model: BoardModel::ArduinoUno,
    pins: &[
        (0, IO),
        (1, IO),
        (2, IO),
        (3, IO),
        (4, IO),
        (5, IO),
        (6, IO),
        (7, IO),
        (8, IO),
        (9, IO),
        (10, IO),
        (11, IO),
        (12, IO),
        (13, IO),
        (14, IO),
        (15, IO),
        (16, IO),
        (17, IO),
        (18, SDA),
        (19, SCL),
    ],
};
