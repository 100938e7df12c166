//! Typed request extensions.
//!
//! Middleware attaches request-scoped state to an [`HttpRequest`](crate::HttpRequest)
//! by type rather than by a reserved string key, so nothing it stores can collide
//! with real query, header or cookie data.
//!
//! Values are held behind `Arc`, which keeps a cloned request pointing at the
//! same state. State that must be mutated after insertion should carry its own
//! interior mutability.
//!
//! # Example
//!
//! ```rust
//! use gauntlet_core::Extensions;
//!
//! #[derive(Debug, PartialEq)]
//! struct RequestId(u64);
//!
//! let mut ext = Extensions::new();
//! ext.insert(RequestId(7));
//!
//! assert_eq!(ext.get::<RequestId>(), Some(&RequestId(7)));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-keyed map of request-scoped values.
#[derive(Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Insert a value, replacing any previous value of the same type.
    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.insert_arc(Arc::new(value));
    }

    /// Insert an already shared value.
    #[inline]
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.map
            .insert(TypeId::of::<T>(), value as Arc<dyn Any + Send + Sync>);
    }

    /// Get a reference to the value of type `T`, if any.
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<T>())
    }

    /// Get a shared handle to the value of type `T`, if any.
    #[inline]
    pub fn get_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.clone().downcast::<T>().ok())
    }

    /// Get the value of type `T`, creating it with `init` on first access.
    ///
    /// ```rust
    /// use gauntlet_core::Extensions;
    ///
    /// let mut ext = Extensions::new();
    /// assert_eq!(*ext.get_or_insert_with(|| 1u8), 1);
    /// assert_eq!(*ext.get_or_insert_with(|| 2u8), 1);
    /// ```
    pub fn get_or_insert_with<T, F>(&mut self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get_arc::<T>() {
            return existing;
        }
        let value = Arc::new(init());
        self.insert_arc(value.clone());
        value
    }

    #[inline]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Remove the value of type `T`. Returns true if one was present.
    #[inline]
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> bool {
        self.map.remove(&TypeId::of::<T>()).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_insert_and_get() {
        let mut ext = Extensions::new();

        ext.insert(42i32);
        ext.insert("hello".to_string());

        assert_eq!(ext.get::<i32>(), Some(&42));
        assert_eq!(ext.get::<String>(), Some(&"hello".to_string()));
        assert_eq!(ext.get::<f64>(), None);
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut ext = Extensions::new();

        ext.insert(42i32);
        ext.insert(100i32);

        assert_eq!(ext.get::<i32>(), Some(&100));
    }

    #[test]
    fn test_get_or_insert_with_creates_once() {
        let mut ext = Extensions::new();
        let mut calls = 0;

        let first = ext.get_or_insert_with(|| {
            calls += 1;
            Mutex::new(Vec::<u8>::new())
        });
        first.lock().unwrap().push(1);

        let second = ext.get_or_insert_with(|| {
            calls += 1;
            Mutex::new(Vec::<u8>::new())
        });

        assert_eq!(calls, 1);
        assert_eq!(*second.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_clone_shares_values() {
        let mut ext = Extensions::new();
        let shared = ext.get_or_insert_with(|| Mutex::new(0u32));

        let cloned = ext.clone();
        *shared.lock().unwrap() += 5;

        let seen = cloned.get::<Mutex<u32>>().unwrap();
        assert_eq!(*seen.lock().unwrap(), 5);
    }

    #[test]
    fn test_remove() {
        let mut ext = Extensions::new();
        ext.insert(42i32);

        assert!(ext.remove::<i32>());
        assert!(!ext.contains::<i32>());
        assert!(ext.is_empty());
    }
}
