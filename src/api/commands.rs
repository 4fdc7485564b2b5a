//! Plugin command registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use serde_json::Value;

pub type CommandCallback = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Commands {
    registry: Arc<Mutex<FxHashMap<String, CommandCallback>>>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `name`, replacing any previous registration.
    pub fn register_command(
        &self,
        name: impl Into<String>,
        callback: impl Fn(Value) + Send + Sync + 'static,
    ) {
        self.lock().insert(name.into(), Arc::new(callback));
    }

    pub fn unregister_command(&self, name: &str) -> bool {
        self.lock().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Runs the command if registered. Unknown names are logged and ignored.
    pub fn on_command(&self, name: &str, args: Value) -> bool {
        let callback = self.lock().get(name).cloned();
        match callback {
            Some(callback) => {
                callback(args);
                true
            }
            None => {
                tracing::warn!(command = %name, "unknown command");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, CommandCallback>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/api/commands.rs"]
mod tests;
