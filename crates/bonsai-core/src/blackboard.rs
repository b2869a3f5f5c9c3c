use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

type Value = Box<dyn Any + Send + Sync>;

/// Typed handle for a well-known blackboard entry.
///
/// The name is the same string key the untyped API uses, so typed and untyped
/// access to one entry observe the same value.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Shared key/value store that nodes of one tree communicate through.
///
/// Every call takes the internal lock exactly once, so individual calls are
/// linearizable across threads. Sequences of calls are not atomic: a `has`
/// followed by a `get` may observe different states.
///
/// Reads are "soft": a missing key and a key holding a value of another type
/// both read as `None`.
#[derive(Default)]
pub struct Blackboard {
    values: Mutex<BTreeMap<String, Value>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // A writer that panicked mid-call cannot leave the map half-updated, so
        // the data behind a poisoned lock is still usable.
        self.values.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("blackboard lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    /// Stores `value` under `key`, replacing any previous value of any type.
    pub fn set<T>(&self, key: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.lock().insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value under `key` if it exists and is a `T`.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.lock().get(key)?.downcast_ref::<T>().cloned()
    }

    /// Runs `f` on the value under `key` while the lock is held.
    ///
    /// Useful for values that are expensive or impossible to clone. `f` must not
    /// call back into this blackboard.
    pub fn with<T, R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: 'static,
    {
        let values = self.lock();
        let value = values.get(key)?.downcast_ref::<T>()?;
        Some(f(value))
    }

    /// `true` if any value is stored under `key`, regardless of its type.
    pub fn has(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Removes the entry under `key`. Returns whether an entry existed.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn set_key<T>(&self, key: BbKey<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.set(key.name, value);
    }

    pub fn get_key<T>(&self, key: BbKey<T>) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.get(key.name)
    }

    /// `true` only if the entry exists and holds a `T`.
    pub fn has_key<T>(&self, key: BbKey<T>) -> bool
    where
        T: 'static,
    {
        self.with::<T, ()>(key.name, |_| ()).is_some()
    }

    pub fn remove_key<T>(&self, key: BbKey<T>) -> bool
    where
        T: 'static,
    {
        self.remove(key.name)
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.lock();
        f.debug_struct("Blackboard")
            .field("keys", &values.keys().collect::<Vec<_>>())
            .finish()
    }
}
