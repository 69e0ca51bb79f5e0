//! Named-handle registries.
//!
//! Scripts cannot hold a window control or a decoded bitmap directly, so the
//! runtime keeps such objects in a registry and hands out a generated name
//! instead (`"Shape0"`, `"Image3"`, `"Button2"`).
//!
//! ## Naming
//!
//! - A name is a prefix followed by the registry's counter value.
//! - The counter is atomic and only ever grows. Removing an entry never
//!   frees its number for reuse.
//! - Several prefixes may share one registry and therefore one counter
//!   (controls number buttons and text boxes from the same sequence).

use dashmap::DashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{RuntimeError, RuntimeResult};

/// A generated name referring to a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(String);

impl Handle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Handle {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

struct Entry<T> {
    serial: u64,
    value: T,
}

/// Registry mapping generated names to owned objects
pub struct HandleRegistry<T> {
    kind: &'static str,
    table: DashMap<String, Entry<T>>,
    counter: AtomicU64,
    stats: Mutex<RegistryStats>,
}

impl<T> HandleRegistry<T> {
    /// Create a registry whose first generated number is `first`.
    ///
    /// `kind` names the entries in error messages.
    pub fn new(kind: &'static str, first: u64) -> Self {
        Self {
            kind,
            table: DashMap::new(),
            counter: AtomicU64::new(first),
            stats: Mutex::new(RegistryStats::default()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Store `value` under a freshly generated name
    pub fn add(&self, prefix: &str, value: T) -> Handle {
        let serial = self.counter.fetch_add(1, Ordering::Relaxed);
        let name = format!("{prefix}{serial}");
        self.table.insert(name.clone(), Entry { serial, value });

        if let Ok(mut stats) = self.stats.lock() {
            stats.created += 1;
            let live = stats.created - stats.removed;
            if live > stats.peak {
                stats.peak = live;
            }
        }

        tracing::trace!(kind = self.kind, name = %name, "Registered handle");
        Handle(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Run `f` against the entry named `name`
    pub fn with<R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> RuntimeResult<R> {
        self.table
            .get(name)
            .map(|entry| f(&entry.value))
            .ok_or_else(|| RuntimeError::not_found(self.kind, name))
    }

    /// Run `f` against a mutable borrow of the entry named `name`
    pub fn with_mut<R>(&self, name: &str, f: impl FnOnce(&mut T) -> R) -> RuntimeResult<R> {
        self.table
            .get_mut(name)
            .map(|mut entry| f(&mut entry.value))
            .ok_or_else(|| RuntimeError::not_found(self.kind, name))
    }

    /// Remove an entry, releasing the object it owns.
    ///
    /// Returns `false` when no entry had that name.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.table.remove(name).is_some();
        if removed {
            if let Ok(mut stats) = self.stats.lock() {
                stats.removed += 1;
            }
            tracing::trace!(kind = self.kind, name = %name, "Released handle");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Names of the live entries in creation order
    pub fn names(&self) -> Vec<Handle> {
        let mut entries: Vec<(u64, String)> = self
            .table
            .iter()
            .map(|e| (e.value().serial, e.key().clone()))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, name)| Handle(name)).collect()
    }

    pub fn stats(&self) -> RegistryStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl<T: Clone> HandleRegistry<T> {
    pub fn get(&self, name: &str) -> RuntimeResult<T> {
        self.with(name, T::clone)
    }
}

/// Counters describing a registry's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub created: u64,
    pub removed: u64,
    pub peak: u64,
}

impl RegistryStats {
    pub fn live(&self) -> u64 {
        self.created - self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_then_get() {
        let registry = HandleRegistry::new("Shape", 0);
        let h = registry.add("Shape", 42);
        assert_eq!(h.as_str(), "Shape0");
        assert_eq!(registry.get(&h).unwrap(), 42);
    }

    #[test]
    fn test_remove_then_get_is_not_found() {
        let registry = HandleRegistry::new("Image", 0);
        let h = registry.add("Image", "pixels");
        assert!(registry.remove(&h));
        assert!(!registry.remove(&h));
        assert!(registry.get(&h).unwrap_err().is_not_found());
    }

    #[test]
    fn test_shared_counter_across_prefixes() {
        let registry = HandleRegistry::new("Control", 1);
        assert_eq!(registry.add("Button", ()).as_str(), "Button1");
        assert_eq!(registry.add("TextBox", ()).as_str(), "TextBox2");
        assert_eq!(registry.add("Button", ()).as_str(), "Button3");
    }

    #[test]
    fn test_with_mut_updates_in_place() {
        let registry = HandleRegistry::new("Shape", 0);
        let h = registry.add("Shape", vec![1]);
        registry.with_mut(&h, |v| v.push(2)).unwrap();
        assert_eq!(registry.get(&h).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_stats_track_peak() {
        let registry = HandleRegistry::new("Shape", 0);
        let a = registry.add("Shape", ());
        let b = registry.add("Shape", ());
        registry.remove(&a);
        registry.remove(&b);
        registry.add("Shape", ());
        let stats = registry.stats();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.peak, 2);
        assert_eq!(stats.live(), 1);
    }

    #[test]
    fn test_names_in_creation_order() {
        let registry = HandleRegistry::new("Shape", 0);
        for _ in 0..12 {
            registry.add("Shape", ());
        }
        registry.remove("Shape3");
        let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "Shape0");
        assert_eq!(names[3], "Shape4");
        assert_eq!(names[10], "Shape11");
    }

    #[test]
    fn test_concurrent_adds_never_collide() {
        let registry = std::sync::Arc::new(HandleRegistry::new("Shape", 0));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|i| registry.add("Shape", i))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<Handle> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert_eq!(registry.len(), 800);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generated_names_never_repeat(ops in prop::collection::vec(any::<bool>(), 1..64)) {
            let registry = HandleRegistry::new("Shape", 0);
            let mut seen = std::collections::HashSet::new();
            let mut live: Vec<Handle> = Vec::new();
            for add in ops {
                if add || live.is_empty() {
                    let h = registry.add("Shape", ());
                    prop_assert!(seen.insert(h.clone()));
                    live.push(h);
                } else {
                    let h = live.remove(0);
                    prop_assert!(registry.remove(&h));
                }
            }
            prop_assert_eq!(registry.len(), live.len());
        }
    }
}
