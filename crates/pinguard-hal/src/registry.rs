//! [`BoardProfileRegistry`] – resolves a board model string to its profile.
//!
//! Resolution never fails. Unknown or empty model names fall back to the
//! default profile, which is always the full-featured ESP32 DevKit. Any
//! rejection for such a request happens later at pin level, when the default
//! profile lacks the requested pin.

use tracing::{debug, warn};

use crate::board::{BoardModel, BoardProfile, ESP32_DEVKIT};

/// Model used whenever a requested model has no registered profile.
pub const DEFAULT_MODEL: BoardModel = BoardModel::Esp32Devkit;

/// Lookup table from model name to static [`BoardProfile`].
///
/// # Example
///
/// ```
/// use pinguard_hal::{BoardModel, BoardProfileRegistry};
///
/// let registry = BoardProfileRegistry::new();
/// assert_eq!(registry.resolve("nodemcu").model(), BoardModel::Esp8266Nodemcu);
/// assert_eq!(registry.resolve("no-such-board").model(), BoardModel::Esp32Devkit);
/// ```
#[derive(Debug, Clone)]
pub struct BoardProfileRegistry {
    profiles: Vec<&'static BoardProfile>,
    default: &'static BoardProfile,
}

impl Default for BoardProfileRegistry {
    fn default() -> Self {
        Self {
            profiles: BoardModel::ALL.iter().map(|m| m.profile()).collect(),
            default: &ESP32_DEVKIT,
        }
    }
}

impl BoardProfileRegistry {
    /// Create a registry holding every built-in board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `board_model` to a profile, falling back to the default.
    pub fn resolve(&self, board_model: &str) -> &'static BoardProfile {
        if board_model.trim().is_empty() {
            debug!("empty board model; using default profile");
            return self.default;
        }
        match board_model.parse::<BoardModel>() {
            Ok(model) => self.get(model).unwrap_or(self.default),
            Err(_) => {
                warn!(
                    board_model,
                    fallback = %self.default.model(),
                    "unknown board model; using default profile"
                );
                self.default
            }
        }
    }

    /// Registered profile for `model`, if any.
    pub fn get(&self, model: BoardModel) -> Option<&'static BoardProfile> {
        self.profiles.iter().copied().find(|p| p.model() == model)
    }

    pub fn default_profile(&self) -> &'static BoardProfile {
        self.default
    }

    /// Registered models, in registration order.
    pub fn models(&self) -> impl Iterator<Item = BoardModel> + '_ {
        self.profiles.iter().map(|p| p.model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ESP8266_NODEMCU;

    #[test]
    fn known_models_resolve_to_their_profile() {
        let registry = BoardProfileRegistry::new();
        for model in BoardModel::ALL {
            assert_eq!(registry.resolve(model.id()).model(), model);
        }
        assert_eq!(registry.resolve("ESP8266"), &ESP8266_NODEMCU);
    }

    #[test]
    fn unknown_model_falls_back_to_full_featured_profile() {
        let registry = BoardProfileRegistry::new();
        assert_eq!(registry.resolve("teensy-4.1"), &ESP32_DEVKIT);
    }

    #[test]
    fn empty_model_falls_back_to_default() {
        let registry = BoardProfileRegistry::new();
        assert_eq!(registry.resolve(""), &ESP32_DEVKIT);
        assert_eq!(registry.resolve("   "), &ESP32_DEVKIT);
    }

    #[test]
    fn default_profile_is_the_largest_board() {
        let registry = BoardProfileRegistry::new();
        let default = registry.default_profile();
        assert_eq!(default.model(), DEFAULT_MODEL);
        assert!(BoardModel::ALL
            .iter()
            .all(|m| m.profile().pin_count() <= default.pin_count()));
    }

    #[test]
    fn models_lists_every_builtin_board() {
        let registry = BoardProfileRegistry::new();
        let models: Vec<_> = registry.models().collect();
        assert_eq!(models, BoardModel::ALL.to_vec());
    }
}
