//! Batch checking of a TOML wiring manifest.
//!
//! ```toml
//! [[device]]
//! id = "greenhouse-1"
//! board = "esp32"
//!
//! [[device.peripheral]]
//! name = "soil-moisture"
//! pin = 34
//! role = "sensor"
//! interface = "analog"
//!
//! [[device.peripheral]]
//! name = "bme280"
//! pin = 21
//! role = "sensor"
//! interface = "i2c"
//! address = 0x76
//! ```
//!
//! Every peripheral produces one [`ReportLine`]. Devices without a `board`
//! use the configured default model.

use std::fs;
use std::path::Path;

use pinguard_kernel::RegistrationGate;
use pinguard_types::{InterfaceType, PeripheralRole, PinGuardError, RegistrationRequest, ValidationOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    pub board: Option<String>,
    #[serde(default, rename = "peripheral")]
    pub peripherals: Vec<PeripheralEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PeripheralEntry {
    pub name: Option<String>,
    pub pin: u16,
    pub role: PeripheralRole,
    pub interface: InterfaceType,
    pub address: Option<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Accepted,
    Rejected,
    Conflict,
}

/// Result of one manifest peripheral, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub device_id: String,
    pub board_model: String,
    pub peripheral: String,
    pub pin: u16,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReportLine {
    pub fn is_accepted(&self) -> bool {
        self.status == Status::Accepted
    }
}

pub fn parse(raw: &str) -> Result<Manifest, PinGuardError> {
    toml::from_str(raw).map_err(|e| PinGuardError::Manifest(e.to_string()))
}

pub fn load(path: &Path) -> Result<Manifest, PinGuardError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| PinGuardError::Manifest(format!("failed to read {}: {}", path.display(), e)))?;
    parse(&raw)
}

/// Register and validate every peripheral of every device in `manifest`.
pub fn check(gate: &RegistrationGate, manifest: &Manifest, default_board: &str) -> Vec<ReportLine> {
    let mut lines = Vec::new();
    for device in &manifest.devices {
        let board = device.board.as_deref().unwrap_or(default_board);
        for (idx, p) in device.peripherals.iter().enumerate() {
            let peripheral = p.name.clone().unwrap_or_else(|| format!("#{idx}"));
            let mut line = ReportLine {
                device_id: device.id.clone(),
                board_model: board.to_string(),
                peripheral,
                pin: p.pin,
                status: Status::Accepted,
                reason: None,
                message: None,
            };

            let result = match RegistrationRequest::from_parts(
                device.id.clone(),
                p.pin,
                p.role,
                p.interface,
                p.address,
            ) {
                Ok(request) => gate.register(&device.id, board, &request),
                Err(reason) => Ok(ValidationOutcome::rejected(reason, shape_message(p))),
            };

            match result {
                Ok(ValidationOutcome::Accepted) => {}
                Ok(ValidationOutcome::Rejected { reason, message }) => {
                    line.status = Status::Rejected;
                    line.reason = Some(reason.code().to_string());
                    line.message = Some(message);
                }
                Err(e) => {
                    line.status = Status::Conflict;
                    line.reason = Some(e.code().to_string());
                    line.message = Some(e.to_string());
                }
            }
            lines.push(line);
        }
    }
    let accepted = lines.iter().filter(|l| l.is_accepted()).count();
    info!(total = lines.len(), accepted, "manifest checked");
    lines
}

fn shape_message(p: &PeripheralEntry) -> String {
    match p.address {
        None => format!("{} interface requires an address", p.interface),
        Some(a) => format!("address {a} given for {} interface", p.interface),
    }
}
