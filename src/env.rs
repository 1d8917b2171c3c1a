//! Lazily-completed symbol environments.
//!
//! Binding a class's hierarchy or type arguments can require first binding
//! another class, which can require the first again -- inheritance cycles,
//! illegal in valid Java but something the binder must still terminate on
//! cleanly. [`LazyEnv`] is the teacher's `CachingClassLoader` pattern
//! (`jvm::class_loader::CachingClassLoader`, a `RwLock<HashMap<..>>` guarding
//! a memoized completer) generalized from "load bytes for a class" to "run
//! any completer for any key, detecting self-reentrancy."
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// A value not yet computed, in progress, or done, for one key of a
/// [`LazyEnv`].
#[derive(Debug, Clone)]
enum Slot<V> {
    InProgress,
    Done(Rc<V>),
}

/// Something a [`LazyEnv`] can run to produce the value for a key, with
/// access back to the environment so completing one key can look up others
/// (this is exactly how `HierarchyBinder` looks up a superclass's own
/// completed hierarchy while completing a subclass).
pub trait Completer<K, V> {
    /// Computes the value for `key`. May call [`LazyEnv::get`] on `env` for
    /// other keys; a self-referential or mutually-recursive completion is
    /// caught by the environment, not by the completer.
    fn complete(&self, key: &K, env: &LazyEnv<K, V, Self>) -> Result<V, LazyBindingError<K>>
    where
        Self: Sized;
}

/// An error from [`LazyEnv::get`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LazyBindingError<K: Debug> {
    /// The completer for `key` called back into `key` itself, directly or
    /// transitively, before finishing -- e.g. `class A extends B` and
    /// `class B extends A`.
    #[error("cyclic dependency while binding {0:?}")]
    Cycle(K),
}

/// A cache of lazily-computed, memoized values keyed by `K`, with
/// cycle detection during completion.
///
/// Single-threaded by design: the driver (§5) runs phases on the calling
/// thread, so a `RefCell` suffices where the teacher's `CachingClassLoader`
/// needed an `RwLock` for its cross-thread class loader use case.
pub struct LazyEnv<K, V, C> {
    completer: C,
    cache: RefCell<HashMap<K, Slot<V>>>,
}

impl<K, V, C> LazyEnv<K, V, C>
where
    K: Eq + Hash + Clone + Debug,
    C: Completer<K, V>,
{
    /// Creates an environment backed by `completer`.
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Gets the value for `key`, computing and memoizing it via the
    /// completer on first access.
    ///
    /// # Errors
    /// Returns [`LazyBindingError::Cycle`] if completing `key` requires
    /// completing `key` again before finishing.
    pub fn get(&self, key: &K) -> Result<Rc<V>, LazyBindingError<K>> {
        if let Some(slot) = self.cache.borrow().get(key) {
            return match slot {
                Slot::Done(value) => Ok(Rc::clone(value)),
                Slot::InProgress => Err(LazyBindingError::Cycle(key.clone())),
            };
        }
        self.cache
            .borrow_mut()
            .insert(key.clone(), Slot::InProgress);
        let value = self.completer.complete(key, self)?;
        let rc = Rc::new(value);
        self.cache
            .borrow_mut()
            .insert(key.clone(), Slot::Done(Rc::clone(&rc)));
        Ok(rc)
    }

    /// `true` if `key` has already been fully completed.
    #[must_use]
    pub fn is_done(&self, key: &K) -> bool {
        matches!(self.cache.borrow().get(key), Some(Slot::Done(_)))
    }
}
