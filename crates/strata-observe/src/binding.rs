//! Scoped listener bindings.
//!
//! Observe and unobserve must be paired on every exit path, or a
//! destroyed listener leaves a dangling registration behind. [`Binding`]
//! makes the pairing structural: it observes on construction and
//! unobserves on drop.

use std::rc::Rc;

use strata_core::{FlatIndex, ListenerRef};

use crate::registry::SharedRegistry;

/// RAII guard tying a listener registration to a scope.
///
/// Construction appends the (listener, index) pair to the registry;
/// dropping the binding removes it, including on early returns and
/// unwinds. The listener itself stays alive as long as the binding (or
/// any other `ListenerRef` clone) does.
///
/// Removal matches every pair with this listener identity and index, so
/// two bindings of the same `ListenerRef` at the same index are not
/// independent scopes: dropping either clears both registrations. Use a
/// separate `ListenerRef` per binding when independent lifetimes are
/// needed.
#[must_use]
pub struct Binding {
    registry: SharedRegistry,
    listener: ListenerRef,
    index: FlatIndex,
}

impl Binding {
    /// Register `listener` at `index` and return the guard that will
    /// unregister it.
    pub fn new(registry: SharedRegistry, listener: ListenerRef, index: FlatIndex) -> Self {
        registry.borrow_mut().observe(&listener, index);
        Self {
            registry,
            listener,
            index,
        }
    }

    /// The bound listener.
    pub fn listener(&self) -> &ListenerRef {
        &self.listener
    }

    /// The flat index this binding listens on.
    pub fn index(&self) -> FlatIndex {
        self.index
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.registry
            .borrow_mut()
            .unobserve(&self.listener, self.index);
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("index", &self.index)
            .field("listener", &Rc::as_ptr(&self.listener))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use strata_core::{listener, Value};

    use crate::registry::{fire, ObserverRegistry};

    #[test]
    fn binding_observes_on_creation_and_unobserves_on_drop() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let l = listener(move |v: &Value| sink.borrow_mut().push(v.clone()));

        {
            let binding = Binding::new(Rc::clone(&registry), Rc::clone(&l), FlatIndex(2));
            assert_eq!(binding.index(), FlatIndex(2));
            fire(&registry, FlatIndex(2), &Value::I32(42));
        }
        // Out of scope: the registration is gone.
        fire(&registry, FlatIndex(2), &Value::I32(137));

        assert_eq!(*seen.borrow(), vec![Value::I32(42)]);
        assert!(registry.borrow().is_empty());
    }

    #[test]
    fn duplicate_bindings_of_one_listener_clear_together() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let l = listener(move |_: &Value| *c.borrow_mut() += 1);

        let first = Binding::new(Rc::clone(&registry), Rc::clone(&l), FlatIndex(0));
        let second = Binding::new(Rc::clone(&registry), Rc::clone(&l), FlatIndex(0));
        drop(first);

        fire(&registry, FlatIndex(0), &Value::Bool(true));
        // Drop removes every matching pair, so one guard going out of
        // scope clears both registrations of the same listener.
        assert_eq!(*count.borrow(), 0);
        drop(second);
    }
}
