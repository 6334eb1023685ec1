//! REPL – Read-Eval-Print Loop for the PinGuard interactive shell.
//!
//! Supported slash-commands:
//!   /help                      – show this list
//!   /boards                    – list supported board models
//!   /pins <board>              – show the pin table of a board
//!   /bind [device] [board]     – bind a device to a board model
//!   /devices                   – list current bindings
//!   /check <device> <board> <pin> <role> <interface> [address]
//!                              – register and validate one peripheral
//!   /schema                    – print the request JSON schema
//!   /settings                  – edit `~/.pinguard/config.toml`
//!   /quit | /exit              – exit the CLI

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pinguard_hal::BoardModel;
use pinguard_kernel::RegistrationGate;
use pinguard_types::{InterfaceType, PeripheralRole, RegistrationRequest, ValidationOutcome};

use crate::config::{self, Config};

/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Boards,
    Pins(String),
    Bind {
        device: Option<String>,
        board: Option<String>,
    },
    Devices,
    Check {
        device: String,
        board: String,
        pin: u16,
        role: PeripheralRole,
        interface: InterfaceType,
        address: Option<i16>,
    },
    Schema,
    Settings,
    Quit,
}

const CHECK_USAGE: &str = "usage: /check <device> <board> <pin> <sensor|actuator> <digital|analog|i2c> [address]";

/// Parse one input line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    match head {
        "/help" => Ok(Command::Help),
        "/boards" => Ok(Command::Boards),
        "/pins" => match args.as_slice() {
            [board] => Ok(Command::Pins(board.to_string())),
            _ => Err("usage: /pins <board>".to_string()),
        },
        "/bind" => match args.as_slice() {
            [] => Ok(Command::Bind { device: None, board: None }),
            [device] => Ok(Command::Bind {
                device: Some(device.to_string()),
                board: None,
            }),
            [device, board] => Ok(Command::Bind {
                device: Some(device.to_string()),
                board: Some(board.to_string()),
            }),
            _ => Err("usage: /bind [device] [board]".to_string()),
        },
        "/devices" => Ok(Command::Devices),
        "/check" => {
            let (device, board, pin, role, interface, address) = match args.as_slice() {
                [d, b, p, r, i] => (d, b, p, r, i, None),
                [d, b, p, r, i, a] => (d, b, p, r, i, Some(parse_address(a)?)),
                _ => return Err(CHECK_USAGE.to_string()),
            };
            Ok(Command::Check {
                device: device.to_string(),
                board: board.to_string(),
                pin: pin
                    .parse()
                    .map_err(|_| format!("invalid pin number: {pin:?}"))?,
                role: role.parse()?,
                interface: interface.parse()?,
                address,
            })
        }
        "/schema" => Ok(Command::Schema),
        "/settings" => Ok(Command::Settings),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal bus address; negative values
/// are kept so the engine can classify them.
pub fn parse_address(raw: &str) -> Result<i16, String> {
    let invalid = || format!("invalid address: {raw:?}");
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    // The sign is handled above; the integer parsers would accept another one.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let magnitude = i32::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let value = if negative { -magnitude } else { magnitude };
    i16::try_from(value).map_err(|_| invalid())
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled before each prompt and again after each line is read;
/// once set, no further command runs.
pub fn run(shutdown: Arc<AtomicBool>, gate: &RegistrationGate, cfg: Config) {
    run_with(&mut io::stdin().lock(), &shutdown, gate, cfg);
}

/// REPL loop over any line source.
pub(crate) fn run_with<R: BufRead>(
    input: &mut R,
    shutdown: &AtomicBool,
    gate: &RegistrationGate,
    mut cfg: Config,
) {
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "pinguard>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        // Ctrl-C while blocked on the read above.
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let input_line = line.trim();
        if input_line.is_empty() {
            continue;
        }

        match parse_command(input_line) {
            Ok(Command::Help) => cmd_help(),
            Ok(Command::Boards) => cmd_boards(gate),
            Ok(Command::Pins(board)) => cmd_pins(&board),
            Ok(Command::Bind { device, board }) => {
                let device = device.unwrap_or_else(|| cfg.device_id.clone());
                let board = board.unwrap_or_else(|| cfg.default_board_model.clone());
                cmd_bind(gate, &device, &board);
            }
            Ok(Command::Devices) => cmd_devices(gate),
            Ok(Command::Check {
                device,
                board,
                pin,
                role,
                interface,
                address,
            }) => cmd_check(gate, &device, &board, pin, role, interface, address),
            Ok(Command::Schema) => cmd_schema(),
            Ok(Command::Settings) => cmd_settings(input, &mut cfg),
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(msg) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    msg.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "PinGuard Commands".bold().underline());
    println!("  {}                    – list supported boards", "/boards".bold().cyan());
    println!("  {}            – show a board's pin table", "/pins <board>".bold().cyan());
    println!("  {}   – bind a device to a board", "/bind [device] [board]".bold().cyan());
    println!("  {}                   – list device bindings", "/devices".bold().cyan());
    println!("  {}", "/check <device> <board> <pin> <role> <interface> [address]".bold().cyan());
    println!("                              – validate one peripheral");
    println!("  {}                    – print the request JSON schema", "/schema".bold().cyan());
    println!("  {}                  – edit ~/.pinguard/config.toml", "/settings".bold().cyan());
    println!("  {}              – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_boards(gate: &RegistrationGate) {
    let default = gate.profiles().default_profile().model();
    println!("{}", "Supported Boards".bold().underline());
    for model in gate.profiles().models() {
        let marker = if model == default { "▶" } else { " " };
        println!(
            "  {} {:<18} {} pins",
            marker.green(),
            model.id().bold(),
            model.profile().pin_count()
        );
    }
    println!("  Unknown models use {}.", default.id().bold());
}

fn cmd_pins(board: &str) {
    let model = match board.parse::<BoardModel>() {
        Ok(m) => m,
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            return;
        }
    };
    println!("{} {}", "Pin Table".bold().underline(), model.id().bold());
    for (pin, cap) in model.profile().pins() {
        let kind = if cap.is_bus_dedicated() {
            cap.dedicated_bus_role().to_string().cyan()
        } else if cap.is_input_only() {
            "input-only".yellow()
        } else {
            "bidirectional".normal()
        };
        println!("  GPIO{:<3} {}", pin, kind);
    }
}

fn cmd_bind(gate: &RegistrationGate, device: &str, board: &str) {
    match gate.get_or_create_binding(device, board) {
        Ok(b) => println!(
            "{} {} → {} (since {})",
            "✓".green().bold(),
            b.device_id.bold(),
            b.board_model.bold(),
            b.bound_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Err(e) => println!("{} {}", "✗".red().bold(), e.to_string().red()),
    }
}

fn cmd_devices(gate: &RegistrationGate) {
    let bindings = gate.devices().bindings();
    if bindings.is_empty() {
        println!("  No devices bound yet.");
        return;
    }
    println!("{}", "Device Bindings".bold().underline());
    for b in bindings {
        println!("  {:<20} {}", b.device_id.bold(), b.board_model);
    }
}

fn cmd_check(
    gate: &RegistrationGate,
    device: &str,
    board: &str,
    pin: u16,
    role: PeripheralRole,
    interface: InterfaceType,
    address: Option<i16>,
) {
    let outcome = match RegistrationRequest::from_parts(device, pin, role, interface, address) {
        Ok(request) => match gate.register(device, board, &request) {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("{} {} {}", "✗".red().bold(), e.code().red(), e);
                return;
            }
        },
        Err(reason) => ValidationOutcome::rejected(reason, format!("{interface} interface with address {address:?}")),
    };
    match outcome {
        ValidationOutcome::Accepted => println!(
            "{} GPIO{} as {} {} accepted",
            "✓".green().bold(),
            pin,
            interface,
            role
        ),
        ValidationOutcome::Rejected { reason, message } => {
            println!("{} {} {}", "✗".red().bold(), reason.code().red(), message.dimmed())
        }
    }
}

fn cmd_schema() {
    let schema = schemars::schema_for!(RegistrationRequest);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_settings<R: BufRead>(input: &mut R, cfg: &mut Config) {
    println!("{}", "Settings Editor".bold().underline());

    let board = prompt_str(
        input,
        &format!("  Default board [{}]: ", cfg.default_board_model),
        &cfg.default_board_model,
    );
    if board.parse::<BoardModel>().is_err() {
        println!(
            "  {} '{}' is not a built-in board; unknown models validate against the default profile",
            "Warning:".yellow(),
            board
        );
    }
    cfg.default_board_model = board;

    cfg.device_id = prompt_str(input, &format!("  Device id     [{}]: ", cfg.device_id), &cfg.device_id);

    let format = prompt_str(input, &format!("  Log format    [{}]: ", cfg.log_format), &cfg.log_format.to_string());
    match format.parse() {
        Ok(f) => cfg.log_format = f,
        Err(e) => println!("  {} {}, keeping {}", "Warning:".yellow(), e, cfg.log_format),
    }

    match config::save(cfg) {
        Ok(()) => println!(
            "{} {}",
            "✓ Settings saved to".green(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt for a string value.  Returns `default` when the user presses Enter.
fn prompt_str<R: BufRead>(input: &mut R, msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed
            }
        }
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("/help"), Ok(Command::Help));
        assert_eq!(parse_command("/exit"), Ok(Command::Quit));
        assert_eq!(parse_command("/pins uno"), Ok(Command::Pins("uno".into())));
        assert!(parse_command("/pins").is_err());
    }

    #[test]
    fn parse_bind_with_optional_args() {
        assert_eq!(
            parse_command("/bind"),
            Ok(Command::Bind { device: None, board: None })
        );
        assert_eq!(
            parse_command("/bind lab-1 nodemcu"),
            Ok(Command::Bind {
                device: Some("lab-1".into()),
                board: Some("nodemcu".into())
            })
        );
    }

    #[test]
    fn parse_check_with_hex_address() {
        let cmd = parse_command("/check lab-1 esp32 21 sensor i2c 0x76").unwrap();
        assert_eq!(
            cmd,
            Command::Check {
                device: "lab-1".into(),
                board: "esp32".into(),
                pin: 21,
                role: PeripheralRole::Sensor,
                interface: InterfaceType::I2c,
                address: Some(0x76),
            }
        );
    }

    #[test]
    fn parse_check_rejects_bad_fields() {
        assert!(parse_command("/check lab-1 esp32 x sensor digital").is_err());
        assert!(parse_command("/check lab-1 esp32 4 blinker digital").is_err());
        assert!(parse_command("/check lab-1 esp32 4 sensor").is_err());
    }

    #[test]
    fn parse_address_forms() {
        assert_eq!(parse_address("64"), Ok(64));
        assert_eq!(parse_address("0x3C"), Ok(0x3C));
        assert_eq!(parse_address("0X7f"), Ok(0x7F));
        assert_eq!(parse_address("-1"), Ok(-1));
        assert_eq!(parse_address("-0x10"), Ok(-16));
        assert_eq!(parse_address("-32768"), Ok(i16::MIN));
        assert_eq!(parse_address("32767"), Ok(i16::MAX));
        assert!(parse_address("0xZZ").is_err());
        assert!(parse_address("70000").is_err());
        assert!(parse_address("32768").is_err());
        assert!(parse_address("-32769").is_err());
        assert!(parse_address("").is_err());
        assert!(parse_address("0x").is_err());
    }

    #[test]
    fn parse_address_rejects_stacked_signs() {
        for raw in ["--5", "-0x-10", "+5", "-+5", "0x+10", "-0X-7f"] {
            assert!(parse_address(raw).is_err(), "{raw} must not parse");
        }
    }

    #[test]
    fn check_with_doubled_minus_is_not_accepted() {
        assert!(parse_command("/check lab-1 esp32 21 sensor i2c --5").is_err());
        let cmd = parse_command("/check lab-1 esp32 21 sensor i2c -5").unwrap();
        match cmd {
            Command::Check { address, .. } => assert_eq!(address, Some(-5)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn session_stops_at_quit() {
        let gate = RegistrationGate::new();
        let shutdown = AtomicBool::new(false);
        let mut script = "/bind dev-1 uno\n/quit\n/bind dev-2 uno\n".as_bytes();

        run_with(&mut script, &shutdown, &gate, Config::default());

        assert!(shutdown.load(Ordering::SeqCst));
        assert!(gate.devices().get("dev-1").is_some());
        assert!(gate.devices().get("dev-2").is_none());
    }

    #[test]
    fn raised_shutdown_flag_skips_pending_input() {
        let gate = RegistrationGate::new();
        let shutdown = AtomicBool::new(true);
        let mut script = "/bind dev-1 uno\n".as_bytes();

        run_with(&mut script, &shutdown, &gate, Config::default());

        assert!(gate.devices().is_empty());
    }

    #[test]
    fn bind_without_args_uses_config_defaults() {
        let gate = RegistrationGate::new();
        let shutdown = AtomicBool::new(false);
        let cfg = Config {
            default_board_model: "nodemcu".into(),
            device_id: "bench".into(),
            ..Config::default()
        };
        let mut script = "/bind\n".as_bytes();

        run_with(&mut script, &shutdown, &gate, cfg);

        assert_eq!(gate.devices().get("bench").unwrap().board_model, "esp8266-nodemcu");
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_command("/start").is_err());
    }
}
