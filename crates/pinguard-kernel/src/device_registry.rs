//! [`DeviceRegistry`] – binds each device id to the board model it was first
//! registered with.
//!
//! Bindings are spread over a fixed number of shards, each behind its own
//! mutex. Registrations of different devices rarely contend; registrations of
//! the same device always hit the same shard, so the check-then-insert in
//! [`DeviceRegistry::register_or_get`] is atomic per device id.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use pinguard_hal::normalize_model;
use pinguard_types::{DeviceBinding, PinGuardError};
use tracing::{info, warn};

const DEFAULT_SHARDS: usize = 16;

type Shard = HashMap<String, DeviceBinding>;

/// Concurrent device-id → board-model table.
///
/// # Example
///
/// ```
/// use pinguard_kernel::DeviceRegistry;
/// use pinguard_types::PinGuardError;
///
/// let registry = DeviceRegistry::new();
/// let first = registry.register_or_get("greenhouse-1", "esp32").unwrap();
/// let again = registry.register_or_get("greenhouse-1", "ESP32-DevKit").unwrap();
/// assert_eq!(first, again);
///
/// let err = registry.register_or_get("greenhouse-1", "arduino-uno").unwrap_err();
/// assert!(matches!(err, PinGuardError::BoardModelConflict { .. }));
/// ```
pub struct DeviceRegistry {
    shards: Vec<Mutex<Shard>>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `count` shards (at least one).
    pub fn with_shards(count: usize) -> Self {
        Self {
            shards: (0..count.max(1)).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    /// Return the binding for `device_id`, creating it with `board_model` on
    /// first use.
    ///
    /// Model strings are compared after [`normalize_model`], so aliases of
    /// the same board are not conflicts.
    ///
    /// # Errors
    ///
    /// [`PinGuardError::BoardModelConflict`] when the device is already bound
    /// to a different model. The existing binding is left untouched.
    pub fn register_or_get(
        &self,
        device_id: &str,
        board_model: &str,
    ) -> Result<DeviceBinding, PinGuardError> {
        let requested = normalize_model(board_model);
        let mut shard = self.lock_shard(device_id);

        if let Some(existing) = shard.get(device_id) {
            if existing.board_model == requested {
                return Ok(existing.clone());
            }
            warn!(
                device_id,
                bound = %existing.board_model,
                requested = %requested,
                "board model conflict"
            );
            return Err(PinGuardError::BoardModelConflict {
                device_id: device_id.to_string(),
                bound: existing.board_model.clone(),
                requested,
            });
        }

        let binding = DeviceBinding {
            device_id: device_id.to_string(),
            board_model: requested,
            bound_at: Utc::now(),
        };
        info!(device_id, board_model = %binding.board_model, "device bound");
        shard.insert(device_id.to_string(), binding.clone());
        Ok(binding)
    }

    /// Current binding for `device_id`, if any.
    pub fn get(&self, device_id: &str) -> Option<DeviceBinding> {
        self.lock_shard(device_id).get(device_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| lock(s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every binding, sorted by device id.
    pub fn bindings(&self) -> Vec<DeviceBinding> {
        let mut all: Vec<DeviceBinding> = self
            .shards
            .iter()
            .flat_map(|s| lock(s).values().cloned().collect::<Vec<_>>())
            .collect();
        all.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        all
    }

    fn lock_shard(&self, device_id: &str) -> MutexGuard<'_, Shard> {
        let mut hasher = DefaultHasher::new();
        device_id.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        lock(&self.shards[idx])
    }
}

// Shards are only mutated by a single `insert`, so a poisoned shard is still consistent.
fn lock(shard: &Mutex<Shard>) -> MutexGuard<'_, Shard> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_creates_binding() {
        let reg = DeviceRegistry::new();
        assert!(reg.is_empty());
        let b = reg.register_or_get("dev-1", "nodemcu").unwrap();
        assert_eq!(b.device_id, "dev-1");
        assert_eq!(b.board_model, "esp8266-nodemcu");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn repeated_registration_returns_same_binding() {
        let reg = DeviceRegistry::new();
        let a = reg.register_or_get("dev-1", "esp32-devkit").unwrap();
        let b = reg.register_or_get("dev-1", "esp32-devkit").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bound_at, b.bound_at);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn different_model_is_a_conflict_and_keeps_binding() {
        let reg = DeviceRegistry::new();
        reg.register_or_get("dev-1", "esp32-devkit").unwrap();
        let err = reg.register_or_get("dev-1", "arduino-uno").unwrap_err();
        assert_eq!(err.code(), "board_model_conflict");
        assert_eq!(reg.get("dev-1").unwrap().board_model, "esp32-devkit");
    }

    #[test]
    fn unknown_models_conflict_with_each_other() {
        // Both fall back to the default profile, but they are different claims.
        let reg = DeviceRegistry::new();
        reg.register_or_get("dev-1", "mystery-a").unwrap();
        assert!(reg.register_or_get("dev-1", "mystery-b").is_err());
        assert!(reg.register_or_get("dev-1", "MYSTERY-A").is_ok());
    }

    #[test]
    fn devices_are_independent() {
        let reg = DeviceRegistry::new();
        reg.register_or_get("dev-1", "esp32").unwrap();
        reg.register_or_get("dev-2", "uno").unwrap();
        assert_eq!(reg.get("dev-2").unwrap().board_model, "arduino-uno");
        assert!(reg.get("dev-3").is_none());
    }

    #[test]
    fn bindings_are_sorted_by_device_id() {
        let reg = DeviceRegistry::with_shards(4);
        for id in ["c", "a", "b"] {
            reg.register_or_get(id, "esp32").unwrap();
        }
        let ids: Vec<_> = reg.bindings().into_iter().map(|b| b.device_id).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn zero_shards_is_clamped_to_one() {
        let reg = DeviceRegistry::with_shards(0);
        reg.register_or_get("dev-1", "esp32").unwrap();
        assert_eq!(reg.len(), 1);
    }
}
