//! Name registry for logged-in users.
//!
//! Maps each display name to the session holding it, and remembers
//! registration order so `who` listings are deterministic. A name is held
//! from successful login until logout or disconnect, after which it is
//! immediately available again.

use std::collections::HashMap;

use crate::driver::SessionId;

/// Server-wide mapping from user name to active session.
#[derive(Debug, Default)]
pub struct NameRegistry {
    /// Name → session ID holding it
    by_name: HashMap<String, SessionId>,
    /// Names in registration order
    order: Vec<String>,
}

impl NameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name for a session.
    ///
    /// Returns `false` if the name is already held; the registry is
    /// unchanged in that case.
    pub fn register(&mut self, name: &str, session_id: SessionId) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), session_id);
        self.order.push(name.to_string());
        true
    }

    /// Remove a name if present, returning the session that held it.
    ///
    /// Absence is not an error: deregistration happens on every teardown
    /// path, including sessions that never completed a login.
    pub fn deregister(&mut self, name: &str) -> Option<SessionId> {
        let session_id = self.by_name.remove(name)?;
        self.order.retain(|n| n != name);
        Some(session_id)
    }

    /// Check whether a name is currently held.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Session holding a name, if any.
    pub fn session_for(&self, name: &str) -> Option<SessionId> {
        self.by_name.get(name).copied()
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut registry = NameRegistry::new();

        assert!(registry.register("alice", 1));
        assert!(registry.contains("alice"));
        assert_eq!(registry.session_for("alice"), Some(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = NameRegistry::new();

        assert!(registry.register("alice", 1));
        assert!(!registry.register("alice", 2));
        assert_eq!(registry.session_for("alice"), Some(1));
    }

    #[test]
    fn deregister_missing_name_is_a_noop() {
        let mut registry = NameRegistry::new();

        assert_eq!(registry.deregister("ghost"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn names_keep_registration_order() {
        let mut registry = NameRegistry::new();

        registry.register("carol", 3);
        registry.register("alice", 1);
        registry.register("bob", 2);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn reregistered_name_moves_to_the_end() {
        let mut registry = NameRegistry::new();

        registry.register("alice", 1);
        registry.register("bob", 2);

        assert_eq!(registry.deregister("alice"), Some(1));
        assert!(registry.register("alice", 3));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["bob", "alice"]);
        assert_eq!(registry.session_for("alice"), Some(3));
    }
}
