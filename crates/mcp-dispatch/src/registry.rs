//! Keyed, insertion-ordered storage for tools, prompts and resources.

use indexmap::IndexMap;

/// An entity stored under a unique key within its namespace.
pub trait Keyed {
    /// Namespace label used in log messages.
    const KIND: &'static str;

    fn key(&self) -> &str;
}

/// Registry for one namespace. Re-registering a key replaces the earlier
/// entry in place (last write wins) and keeps its listing position.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert `entry`, returning the entry it replaced, if any.
    pub fn insert(&mut self, entry: T) -> Option<T> {
        let key = entry.key().to_string();
        let previous = self.entries.insert(key, entry);
        if let Some(prev) = &previous {
            tracing::warn!("Replacing existing {} {}", T::KIND, prev.key());
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Keyed> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> FromIterator<T> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}
