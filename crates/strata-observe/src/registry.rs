//! The observer registry: (listener, flat index) bindings and dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::{FlatIndex, ListenerRef, Value};

/// Insertion-ordered list of (listener, flat index) bindings for one
/// outermost record instance.
///
/// Duplicates are permitted: observing the same listener twice at the
/// same index delivers each event twice until one registration is
/// removed. Removal deletes every pair matching both listener identity
/// and index.
#[derive(Default)]
pub struct ObserverRegistry {
    bindings: Vec<(ListenerRef, FlatIndex)>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of current bindings, duplicates included.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Append a binding. No de-duplication is performed.
    pub fn observe(&mut self, listener: &ListenerRef, index: FlatIndex) {
        self.bindings.push((Rc::clone(listener), index));
    }

    /// Remove every binding matching both `listener` (by allocation
    /// identity) and `index`. Removing a binding that does not exist is
    /// a no-op.
    pub fn unobserve(&mut self, listener: &ListenerRef, index: FlatIndex) {
        self.bindings
            .retain(|(l, i)| !(Rc::ptr_eq(l, listener) && *i == index));
    }

    /// The listeners currently bound to `index`, in registration order.
    ///
    /// Dispatch snapshots this list before invoking any callback, so a
    /// listener that observes or unobserves during its callback cannot
    /// disturb the iteration; its change takes effect from the next
    /// fire.
    pub fn snapshot(&self, index: FlatIndex) -> Vec<ListenerRef> {
        self.bindings
            .iter()
            .filter(|(_, i)| *i == index)
            .map(|(l, _)| Rc::clone(l))
            .collect()
    }
}

/// Shared handle to a registry. A record owns one; nested views and
/// scoped bindings hold clones.
pub type SharedRegistry = Rc<RefCell<ObserverRegistry>>;

/// Dispatch a change event at `index` to every currently bound
/// listener, in registration order.
///
/// The registry borrow is released before any callback runs, so
/// listeners may re-enter the registry. A panicking listener propagates
/// to the caller of the triggering assignment; listeners after it in
/// this event's snapshot do not run, and bindings at other indices are
/// unaffected.
pub fn fire(registry: &SharedRegistry, index: FlatIndex, value: &Value) {
    let matched = registry.borrow().snapshot(index);
    for listener in matched {
        listener.borrow_mut().on_changed(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{listener, Listener};

    #[test]
    fn fire_reaches_only_matching_index() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let sink_a = Rc::clone(&seen_a);
        let sink_b = Rc::clone(&seen_b);
        let a = listener(move |v: &Value| sink_a.borrow_mut().push(v.clone()));
        let b = listener(move |v: &Value| sink_b.borrow_mut().push(v.clone()));

        registry.borrow_mut().observe(&a, FlatIndex(0));
        registry.borrow_mut().observe(&b, FlatIndex(1));

        fire(&registry, FlatIndex(0), &Value::I32(42));
        assert_eq!(*seen_a.borrow(), vec![Value::I32(42)]);
        assert!(seen_b.borrow().is_empty());
    }

    #[test]
    fn dispatch_is_in_registration_order() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let first = listener(move |_: &Value| o1.borrow_mut().push("first"));
        let second = listener(move |_: &Value| o2.borrow_mut().push("second"));

        registry.borrow_mut().observe(&first, FlatIndex(3));
        registry.borrow_mut().observe(&second, FlatIndex(3));
        fire(&registry, FlatIndex(3), &Value::Bool(true));

        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn duplicate_registration_delivers_twice() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let l = listener(move |_: &Value| *c.borrow_mut() += 1);

        registry.borrow_mut().observe(&l, FlatIndex(0));
        registry.borrow_mut().observe(&l, FlatIndex(0));
        fire(&registry, FlatIndex(0), &Value::I32(1));
        assert_eq!(*count.borrow(), 2);

        // One unobserve removes both matching pairs.
        registry.borrow_mut().unobserve(&l, FlatIndex(0));
        fire(&registry, FlatIndex(0), &Value::I32(2));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn unobserve_is_exact_and_tolerates_absence() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let count_a = Rc::new(RefCell::new(0));
        let count_b = Rc::new(RefCell::new(0));
        let ca = Rc::clone(&count_a);
        let cb = Rc::clone(&count_b);
        let a = listener(move |_: &Value| *ca.borrow_mut() += 1);
        let b = listener(move |_: &Value| *cb.borrow_mut() += 1);

        registry.borrow_mut().observe(&a, FlatIndex(5));
        registry.borrow_mut().observe(&b, FlatIndex(5));

        // Wrong index: no-op.
        registry.borrow_mut().unobserve(&a, FlatIndex(4));
        // Never-registered listener: no-op.
        let stranger = listener(|_: &Value| {});
        registry.borrow_mut().unobserve(&stranger, FlatIndex(5));

        registry.borrow_mut().unobserve(&a, FlatIndex(5));
        fire(&registry, FlatIndex(5), &Value::I32(9));
        assert_eq!(*count_a.borrow(), 0);
        assert_eq!(*count_b.borrow(), 1);
    }

    #[test]
    fn observe_during_fire_takes_effect_next_fire() {
        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let late_count = Rc::new(RefCell::new(0));
        let lc = Rc::clone(&late_count);
        let late = listener(move |_: &Value| *lc.borrow_mut() += 1);

        let reg = Rc::clone(&registry);
        let late_for_adder = Rc::clone(&late);
        let adder = listener(move |_: &Value| {
            reg.borrow_mut().observe(&late_for_adder, FlatIndex(0));
        });
        registry.borrow_mut().observe(&adder, FlatIndex(0));

        // The snapshot for this fire predates the registration.
        fire(&registry, FlatIndex(0), &Value::I32(1));
        assert_eq!(*late_count.borrow(), 0);

        fire(&registry, FlatIndex(0), &Value::I32(2));
        assert_eq!(*late_count.borrow(), 1);
    }

    #[test]
    fn listener_may_unobserve_itself_during_fire() {
        struct OneShot {
            registry: SharedRegistry,
            me: Option<ListenerRef>,
            count: Rc<RefCell<i32>>,
        }
        impl Listener for OneShot {
            fn on_changed(&mut self, _: &Value) {
                *self.count.borrow_mut() += 1;
                if let Some(me) = self.me.take() {
                    self.registry.borrow_mut().unobserve(&me, FlatIndex(0));
                }
            }
        }

        let registry: SharedRegistry = Rc::new(RefCell::new(ObserverRegistry::new()));
        let count = Rc::new(RefCell::new(0));
        let concrete = Rc::new(RefCell::new(OneShot {
            registry: Rc::clone(&registry),
            me: None,
            count: Rc::clone(&count),
        }));
        let l: ListenerRef = concrete.clone();
        concrete.borrow_mut().me = Some(Rc::clone(&l));
        registry.borrow_mut().observe(&l, FlatIndex(0));

        fire(&registry, FlatIndex(0), &Value::I32(1));
        fire(&registry, FlatIndex(0), &Value::I32(2));
        assert_eq!(*count.borrow(), 1);
        assert!(registry.borrow().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Observe(usize, u32),
            Unobserve(usize, u32),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..4usize, 0..3u32).prop_map(|(l, i)| Op::Observe(l, i)),
                (0..4usize, 0..3u32).prop_map(|(l, i)| Op::Unobserve(l, i)),
            ]
        }

        proptest! {
            // The registry behaves exactly like a plain list of
            // (listener id, index) pairs with exact-pair removal.
            #[test]
            fn registry_matches_list_model(ops in proptest::collection::vec(op(), 0..40)) {
                let listeners: Vec<ListenerRef> =
                    (0..4).map(|_| listener(|_: &Value| {})).collect();
                let mut registry = ObserverRegistry::new();
                let mut model: Vec<(usize, u32)> = Vec::new();

                for op in ops {
                    match op {
                        Op::Observe(l, i) => {
                            registry.observe(&listeners[l], FlatIndex(i));
                            model.push((l, i));
                        }
                        Op::Unobserve(l, i) => {
                            registry.unobserve(&listeners[l], FlatIndex(i));
                            model.retain(|&(ml, mi)| !(ml == l && mi == i));
                        }
                    }
                }

                prop_assert_eq!(registry.len(), model.len());
                for index in 0..3u32 {
                    let snapshot = registry.snapshot(FlatIndex(index));
                    let expected: Vec<usize> = model
                        .iter()
                        .filter(|&&(_, mi)| mi == index)
                        .map(|&(ml, _)| ml)
                        .collect();
                    prop_assert_eq!(snapshot.len(), expected.len());
                    for (got, &want) in snapshot.iter().zip(&expected) {
                        prop_assert!(Rc::ptr_eq(got, &listeners[want]));
                    }
                }
            }
        }
    }
}
