//! The change-listener capability and per-slot firing policy.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// A component that can receive change notifications from an observable
/// slot.
///
/// Listeners are invoked synchronously, on the caller's thread, before
/// the triggering assignment returns. A listener may re-enter the
/// registry (observe or unobserve) from inside `on_changed`; such
/// changes take effect from the next fire.
pub trait Listener {
    /// Called with the newly assigned value of an observed slot.
    fn on_changed(&mut self, value: &Value);
}

impl<F: FnMut(&Value)> Listener for F {
    fn on_changed(&mut self, value: &Value) {
        self(value)
    }
}

/// Shared, identity-comparable handle to a listener.
///
/// The whole framework is single-threaded by contract, so listeners are
/// shared with `Rc<RefCell<..>>` rather than any locking structure.
/// Registry removal matches on allocation identity (`Rc::ptr_eq`), so
/// the same `ListenerRef` must be used for paired observe/unobserve.
pub type ListenerRef = Rc<RefCell<dyn Listener>>;

/// Wrap a listener (or an `FnMut(&Value)` closure) in a [`ListenerRef`].
pub fn listener<L: Listener + 'static>(l: L) -> ListenerRef {
    Rc::new(RefCell::new(l))
}

/// When an observable slot's assignment fires a change event.
///
/// The fire-on-change policy assumes the slot type has meaningful, cheap
/// equality; `Always` is the explicit opt-out for callers that want every
/// assignment delivered regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChangePolicy {
    /// Fire only when the new value differs from the current value.
    #[default]
    OnChange,
    /// Fire on every assignment, equal or not.
    Always,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let l = listener(move |v: &Value| sink.borrow_mut().push(v.clone()));

        l.borrow_mut().on_changed(&Value::I32(42));
        l.borrow_mut().on_changed(&Value::I32(137));
        assert_eq!(*seen.borrow(), vec![Value::I32(42), Value::I32(137)]);
    }

    #[test]
    fn listener_refs_compare_by_identity() {
        let a = listener(|_: &Value| {});
        let b = listener(|_: &Value| {});
        assert!(Rc::ptr_eq(&a, &Rc::clone(&a)));
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn default_policy_is_on_change() {
        assert_eq!(ChangePolicy::default(), ChangePolicy::OnChange);
    }
}
