//! Browsing-session storage.

use std::collections::HashMap;

/// Key/value storage whose lifetime is one browsing session.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory session storage. Dropping it ends the session; a new
/// `BrowserSession` always starts empty.
#[derive(Clone, Debug, Default)]
pub struct BrowserSession {
    entries: HashMap<String, String>,
}

impl BrowserSession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for BrowserSession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
