//! Configuration – reads/writes `~/.pinguard/config.toml`.

use pinguard_hal::DEFAULT_MODEL;
use pinguard_types::PinGuardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s:?}")),
        }
    }
}

/// Persisted CLI configuration stored in `~/.pinguard/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Board model used when a command or manifest entry names none.
    #[serde(default = "default_board_model")]
    pub default_board_model: String,

    /// Device id used by `/bind` when none is given.
    #[serde(default = "default_device_id")]
    pub device_id: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_board_model() -> String {
    DEFAULT_MODEL.id().to_string()
}
fn default_device_id() -> String {
    "cli-device".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_board_model: default_board_model(),
            device_id: default_device_id(),
            log_format: LogFormat::default(),
        }
    }
}

/// Return the path to `~/.pinguard/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".pinguard").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns `None`
/// if the file does not exist.
pub fn load() -> Result<Option<Config>, PinGuardError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load from disk, falling back to defaults (plus env overrides) when the file
/// is missing or unreadable.
pub fn load_or_default() -> (Config, Option<PinGuardError>) {
    match load() {
        Ok(Some(cfg)) => (cfg, None),
        Ok(None) => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            (cfg, None)
        }
        Err(e) => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            (cfg, Some(e))
        }
    }
}

/// Load the file at `path` as-is, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, PinGuardError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        PinGuardError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| PinGuardError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(cfg))
}

/// Apply `PINGUARD_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PINGUARD_BOARD` | `default_board_model` |
/// | `PINGUARD_DEVICE_ID` | `device_id` |
/// | `PINGUARD_LOG_FORMAT` | `log_format` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PINGUARD_BOARD") {
        cfg.default_board_model = v;
    }
    if let Ok(v) = std::env::var("PINGUARD_DEVICE_ID") {
        cfg.device_id = v;
    }
    if let Ok(v) = std::env::var("PINGUARD_LOG_FORMAT")
        && let Ok(format) = v.parse::<LogFormat>()
    {
        cfg.log_format = format;
    }
}

/// Save the config to disk, creating `~/.pinguard/` if necessary.
pub fn save(cfg: &Config) -> Result<(), PinGuardError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), PinGuardError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PinGuardError::Config(format!("failed to create config directory: {}", e))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                PinGuardError::Config(format!("failed to set config directory permissions: {}", e))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| PinGuardError::Config(format!("failed to serialize config: {}", e)))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| {
                PinGuardError::Config(format!("failed to write {}: {}", path.display(), e))
            })?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| PinGuardError::Config(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(())
}
