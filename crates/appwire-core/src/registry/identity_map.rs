//! Bijective identity-to-value map.
//!
//! The building block underneath the combined registry: each identity maps
//! to at most one value and each value to at most one identity. No async
//! behavior; a plain synchronous data structure.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use appwire_protocols::{Identity, RegistryError};

use crate::handle::Handle;

#[cfg(test)]
#[path = "identity_map_tests.rs"]
mod tests;

/// Values storable in an [`IdentityRegistry`].
///
/// Value equality is allocation identity: two clones of the same `Arc` are
/// the same value, two separate allocations are different values even when
/// their contents compare equal.
pub trait RegistryValue: Clone + Send + Sync + 'static {
    /// Stable key identifying the underlying allocation.
    fn value_key(&self) -> usize;
}

impl<T: ?Sized + Send + Sync + 'static> RegistryValue for Arc<T> {
    fn value_key(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }
}

struct Inner<V> {
    by_id: HashMap<Identity, V>,
    by_value: HashMap<usize, Identity>,
}

/// Bijective map from identity to value with handle-based removal.
pub struct IdentityRegistry<V: RegistryValue> {
    inner: Arc<Mutex<Inner<V>>>,
}

impl<V: RegistryValue> Clone for IdentityRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: RegistryValue> IdentityRegistry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                by_id: HashMap::new(),
                by_value: HashMap::new(),
            })),
        }
    }

    /// Register `value` under `id`.
    ///
    /// Re-registering the exact same `(id, value)` pair is idempotent and
    /// returns a handle equivalent to the original.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateIdentity`] when `id` already holds a
    ///   different value.
    /// - [`RegistryError::ConflictingIdentity`] when `value` is already held
    ///   under a different identity; the existing identity is reported.
    pub fn register(&self, id: Identity, value: V) -> Result<Handle, RegistryError> {
        let mut inner = self.inner.lock();
        let key = value.value_key();

        if let Some(existing) = inner.by_id.get(&id) {
            if existing.value_key() == key {
                return Ok(self.removal_handle(id, key));
            }
            return Err(RegistryError::DuplicateIdentity(id.to_string()));
        }
        if let Some(existing_id) = inner.by_value.get(&key) {
            return Err(RegistryError::ConflictingIdentity(existing_id.to_string()));
        }

        inner.by_value.insert(key, id.clone());
        inner.by_id.insert(id.clone(), value);
        Ok(self.removal_handle(id, key))
    }

    /// Handle removing exactly the `(id, key)` pair, idempotently. If the
    /// identity has since been deleted or rebound, the handle is a no-op.
    fn removal_handle(&self, id: Identity, key: usize) -> Handle {
        let weak: Weak<Mutex<Inner<V>>> = Arc::downgrade(&self.inner);
        Handle::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock();
                let still_bound = inner.by_id.get(&id).map(RegistryValue::value_key) == Some(key);
                if still_bound {
                    inner.by_id.remove(&id);
                    inner.by_value.remove(&key);
                }
            }
        })
    }

    /// Get the value registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if absent.
    pub fn get(&self, id: &Identity) -> Result<V, RegistryError> {
        self.inner
            .lock()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Identity under which `value` is registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] if the value holds no
    /// identity.
    pub fn identify(&self, value: &V) -> Result<Identity, RegistryError> {
        self.identify_key(value.value_key())
    }

    pub(crate) fn identify_key(&self, key: usize) -> Result<Identity, RegistryError> {
        self.inner
            .lock()
            .by_value
            .get(&key)
            .cloned()
            .ok_or(RegistryError::NotRegistered)
    }

    /// Whether `value` holds an identity.
    pub fn contains(&self, value: &V) -> bool {
        self.inner
            .lock()
            .by_value
            .contains_key(&value.value_key())
    }

    /// Whether `id` is in use.
    pub fn has_id(&self, id: &Identity) -> bool {
        self.inner.lock().by_id.contains_key(id)
    }

    /// Remove the entry under `id`. Returns true if something was removed.
    /// After removal both the identity and the value are free for reuse.
    pub fn delete(&self, id: &Identity) -> bool {
        let mut inner = self.inner.lock();
        match inner.by_id.remove(id) {
            Some(value) => {
                inner.by_value.remove(&value.value_key());
                true
            }
            None => false,
        }
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().by_id.is_empty()
    }
}

impl<V: RegistryValue> Default for IdentityRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
