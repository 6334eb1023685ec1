//! `pinguard` – PinGuard Command Line Interface
//!
//! 1. Loads `~/.pinguard/config.toml` (plus `PINGUARD_*` overrides).
//! 2. `pinguard check <manifest.toml>` validates a wiring manifest and prints
//!    one JSON line per peripheral; the exit status is non-zero when anything
//!    was refused.
//! 3. `pinguard schema` prints the registration request JSON schema.
//! 4. Without a subcommand, drops the user into an **interactive REPL**.
//!    **Ctrl-C** exits it cleanly.

mod config;
mod manifest;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, warn};

use pinguard_kernel::RegistrationGate;
use pinguard_types::RegistrationRequest;

use config::LogFormat;

/// PinGuard - hardware capability validation for peripheral registrations
#[derive(Parser, Debug)]
#[command(name = "pinguard")]
#[command(version)]
#[command(about = "Validate peripheral wiring against board pin capabilities")]
#[command(long_about = None)]
struct Args {
    /// Board model used when none is given (overrides the config file)
    #[arg(short, long)]
    board: Option<String>,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Validate every peripheral of a TOML wiring manifest
    Check {
        /// Path to the manifest file
        manifest: PathBuf,
    },
    /// Print the JSON schema of a registration request
    Schema,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (mut cfg, cfg_err) = config::load_or_default();
    if args.json {
        cfg.log_format = LogFormat::Json;
    }
    if let Some(board) = args.board.clone() {
        cfg.default_board_model = board;
    }

    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG (default "info") selects verbosity; logs go to stderr so the
    // JSON report on stdout stays machine-readable.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    match cfg.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init(),
    }

    if let Some(e) = cfg_err {
        warn!(error = %e, "Failed to load config; using defaults");
    }

    let gate = RegistrationGate::new();

    match args.command {
        Some(Cmd::Check { manifest }) => run_check(&gate, &manifest, &cfg.default_board_model),
        Some(Cmd::Schema) => run_schema(),
        None => {
            run_interactive(&gate, cfg);
            ExitCode::SUCCESS
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

fn run_check(gate: &RegistrationGate, path: &std::path::Path, default_board: &str) -> ExitCode {
    let manifest = match manifest::load(path) {
        Ok(m) => m,
        Err(e) => {
            error!(code = e.code(), error = %e, "Cannot check manifest");
            return ExitCode::from(2);
        }
    };

    let lines = manifest::check(gate, &manifest, default_board);
    let mut all_accepted = true;
    for line in &lines {
        all_accepted &= line.is_accepted();
        match serde_json::to_string(line) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to serialize report line");
                return ExitCode::from(2);
            }
        }
    }

    if all_accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_schema() -> ExitCode {
    let schema = schemars::schema_for!(RegistrationRequest);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize schema");
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(gate: &RegistrationGate, cfg: config::Config) {
    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – press Enter to leave PinGuard.".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    if config::config_path().exists() {
        println!(
            "  Config loaded from {}",
            config::config_path().display().to_string().bold()
        );
    } else {
        println!(
            "  No config file; run {} to create one.",
            "/settings".bold().cyan()
        );
    }
    println!(
        "  Default board {}, device {}",
        cfg.default_board_model.bold(),
        cfg.device_id.bold()
    );
    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(shutdown, gate, cfg);
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___  _       _____                     _ "#.bold().cyan());
    println!("{}", r#"  / _ \(_)__   / ___/_ _____ ________ __| |"#.bold().cyan());
    println!("{}", r#" / ___/ / _ \ / (_ / // / _ `/ __/ _ `/ _ |"#.bold().cyan());
    println!("{}", r#"/_/  /_/_//_/ \___/\_,_/\_,_/_/  \_,_/\_,_|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "PinGuard".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Hardware Capability Validation");
    println!();
}
