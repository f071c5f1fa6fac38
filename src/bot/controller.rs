use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Registry a bot removes itself from when its session ends.
///
/// Bots hold only a weak reference, so a registry never outlives its owner
/// because of the bots it tracks.
pub trait BotController: Send + Sync {
    fn remove(&self, name: &str);
}

/// In-memory controller keyed by bot name.
#[derive(Debug, Default)]
pub struct BotRegistry {
    bots: Mutex<HashSet<String>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if a bot with this name is already registered.
    pub fn register(&self, name: impl Into<String>) -> bool {
        self.bots().insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bots().contains(name)
    }

    pub fn len(&self) -> usize {
        self.bots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bots().iter().cloned().collect();
        names.sort();
        names
    }

    fn bots(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.bots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BotController for BotRegistry {
    fn remove(&self, name: &str) {
        if self.bots().remove(name) {
            tracing::debug!(bot = %name, "removed from registry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_remove() {
        let registry = BotRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register("Bot1"));
        assert!(!registry.register("Bot1"));
        assert!(registry.register("Bot2"));
        assert_eq!(registry.names(), vec!["Bot1".to_string(), "Bot2".to_string()]);

        registry.remove("Bot1");
        assert!(!registry.contains("Bot1"));
        assert_eq!(registry.len(), 1);

        // removing twice is harmless
        registry.remove("Bot1");
        assert_eq!(registry.len(), 1);
    }
}
