//! Name-keyed cache of canonical objects
//!
//! Deduplicates construction of repeated sub-objects (AI templates today).
//! The first request for a name builds the canonical object and stores it;
//! every later request observes that entry. The canonical object is only
//! ever handed out behind an `Arc`, so it stays read-only; callers that need
//! a private instance use [`ObjectCache::instantiate`] to get a deep clone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe find-or-build cache keyed by logical name
pub struct ObjectCache<T> {
    /// Cache storage: name -> canonical object
    entries: Mutex<HashMap<String, Arc<T>>>,
    /// Label used in log output
    label: &'static str,
}

impl<T> ObjectCache<T> {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::with_label("object")
    }

    /// Create a new empty cache whose log lines are tagged with `label`
    pub fn with_label(label: &'static str) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            label,
        }
    }

    /// Return the canonical object for `name`, building it if absent
    ///
    /// The lock is held across the lookup, the call to `build` and the
    /// insertion, so concurrent callers never build the same name twice.
    /// `build` must therefore not touch this cache. On failure nothing is
    /// inserted and the error is returned unchanged.
    ///
    /// # Returns
    /// The canonical object and `true` if it was already cached
    pub fn find_or_insert<E, F>(&self, name: &str, build: F) -> Result<(Arc<T>, bool), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut entries = self.lock();

        if let Some(existing) = entries.get(name) {
            log::trace!("{} cache hit for \"{}\"", self.label, name);
            return Ok((Arc::clone(existing), true));
        }

        let canonical = Arc::new(build()?);
        entries.insert(name.to_string(), Arc::clone(&canonical));
        log::debug!("{} cache miss for \"{}\", inserted canonical entry", self.label, name);

        Ok((canonical, false))
    }

    /// Get a cached object without building
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.lock().get(name).map(Arc::clone)
    }

    /// Check if an object is cached
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Names of every cached object, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Clear all cached objects
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Get the number of cached objects
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Insertion is the last step of every critical section, so a poisoned
    // lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<T>>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T: Clone> ObjectCache<T> {
    /// Like [`find_or_insert`](Self::find_or_insert), but return a private deep copy
    ///
    /// The clone is taken after the lock is released; the canonical entry
    /// is never exposed mutably.
    pub fn instantiate<E, F>(&self, name: &str, build: F) -> Result<(T, bool), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let (canonical, was_cached) = self.find_or_insert(name, build)?;
        Ok((T::clone(&canonical), was_cached))
    }
}

impl<T> Default for ObjectCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ObjectCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("label", &self.label)
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_cache_basic() {
        let cache = ObjectCache::new();
        assert!(cache.is_empty());

        let (first, cached) = cache
            .find_or_insert("guard", || Ok::<_, ()>(vec![1, 2, 3]))
            .unwrap();
        assert!(!cached);
        assert_eq!(cache.len(), 1);

        // Second request must not rebuild
        let (second, cached) = cache
            .find_or_insert("guard", || -> Result<Vec<i32>, ()> { panic!("rebuilt") })
            .unwrap();
        assert!(cached);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_build_inserts_nothing() {
        let cache: ObjectCache<String> = ObjectCache::new();
        let result = cache.find_or_insert("broken", || Err("parse failure"));
        assert_eq!(result.unwrap_err(), "parse failure");
        assert!(!cache.contains("broken"));

        // A later, successful build for the same name is allowed
        let (value, cached) = cache
            .find_or_insert("broken", || Ok::<_, &str>("fixed".to_string()))
            .unwrap();
        assert!(!cached);
        assert_eq!(*value, "fixed");
    }

    #[test]
    fn test_concurrent_callers_build_once() {
        let cache = Arc::new(ObjectCache::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let builds = Arc::clone(&builds);
                thread::spawn(move || {
                    let (object, _) = cache
                        .find_or_insert("shared", || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(5));
                            Ok::<_, ()>(String::from("template"))
                        })
                        .unwrap();
                    object
                })
            })
            .collect();

        let objects: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(objects.iter().all(|o| Arc::ptr_eq(o, &objects[0])));
    }

    #[test]
    fn test_instantiate_returns_independent_copy() {
        let cache = ObjectCache::new();
        let (mut copy, _) = cache
            .instantiate("list", || Ok::<_, ()>(vec![1]))
            .unwrap();
        copy.push(2);

        assert_eq!(*cache.get("list").unwrap(), vec![1]);
        let (again, cached) = cache.instantiate("list", || Ok::<_, ()>(vec![9])).unwrap();
        assert!(cached);
        assert_eq!(again, vec![1]);
    }

    #[test]
    fn test_clear_and_names() {
        let cache = ObjectCache::with_label("test");
        cache.find_or_insert("b", || Ok::<_, ()>(2)).unwrap();
        cache.find_or_insert("a", || Ok::<_, ()>(1)).unwrap();
        assert_eq!(cache.names(), vec!["a".to_string(), "b".to_string()]);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
