//! Process-wide name -> Logger map.
//!
//! Grounded in `original_source`'s singleton `LoggerManager`: process-wide
//! singletons are modeled as explicit state with a documented accessor,
//! rather than a lazily-constructed static reached through a global
//! function with no visible storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::Lazy;

use crate::logger::{Logger, LoggerBuilder};

/// Name always present in a freshly constructed registry.
pub const DEFAULT_LOGGER_NAME: &str = "default";

/// `name -> Logger` map with the invariant that a logger named `"default"`
/// always exists and no insertion replaces an existing entry.
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        let default_logger = LoggerBuilder::new().name(DEFAULT_LOGGER_NAME).build();
        let mut loggers = HashMap::new();
        loggers.insert(DEFAULT_LOGGER_NAME.to_string(), Arc::new(default_logger));
        Self {
            loggers: RwLock::new(loggers),
        }
    }

    /// Inserts `logger`. A no-op if a logger with the same name is already
    /// registered; the existing entry is left in place.
    pub fn add(&self, logger: Logger) {
        let mut loggers = self.loggers.write().unwrap();
        loggers
            .entry(logger.name().to_string())
            .or_insert_with(|| Arc::new(logger));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().unwrap().get(name).cloned()
    }

    pub fn default_logger(&self) -> Arc<Logger> {
        self.get(DEFAULT_LOGGER_NAME)
            .expect("default logger always present")
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

/// The process-wide registry instance. Prefer constructing a private
/// [`LoggerRegistry`] in tests; production call sites reach for this.
pub fn global() -> &'static LoggerRegistry {
    &GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    // Guards against concurrent `add` calls racing on the same fresh name.
    static REGISTRY_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn new_registry_has_a_default_logger() {
        let registry = LoggerRegistry::new();
        assert!(registry.get(DEFAULT_LOGGER_NAME).is_some());
    }

    #[test]
    fn add_then_get_returns_the_same_logger() {
        let registry = LoggerRegistry::new();
        let logger = LoggerBuilder::new().name("audit").build();
        registry.add(logger);
        let fetched = registry.get("audit");
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name(), "audit");
    }

    #[test]
    fn second_add_with_same_name_is_a_no_op() {
        let _guard = REGISTRY_TEST_LOCK.lock().unwrap();
        let registry = LoggerRegistry::new();
        registry.add(LoggerBuilder::new().name("audit").build());
        registry.add(LoggerBuilder::new().name("audit").build());
        assert!(registry.get("audit").is_some());
    }

    #[test]
    fn get_unknown_name_returns_none() {
        let registry = LoggerRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }
}
