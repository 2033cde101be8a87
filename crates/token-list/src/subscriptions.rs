use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Opaque handle returned by [`Subscriptions::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Ordered list of callbacks notified synchronously on every trigger.
///
/// Uses interior mutability so callbacks may subscribe or unsubscribe while
/// a trigger is in progress. Each trigger walks a snapshot taken when it
/// starts: changes made during delivery apply from the next trigger on.
pub struct Subscriptions<T> {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Subscriptions<T> {
    /// Empty hub.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Register `callback`; it is called after every subscriber added before it.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    /// Returns `false` if the handle was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }

    /// Call every subscriber, in registration order, with `value`.
    pub fn trigger(&self, value: &T) {
        let snapshot: Vec<(SubscriptionId, Callback<T>)> = self.subscribers.borrow().clone();

        for (id, callback) in snapshot {
            // A callback that re-triggers this hub is still running, so it
            // misses the nested value; every other subscriber receives it.
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(value),
                Err(_) => {
                    tracing::debug!(subscription = id.0, "Skipping re-entrant subscriber");
                }
            }
        }
    }
}

impl<T> Default for Subscriptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subscriptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Mixin giving a type subscribe/unsubscribe over its own hub.
pub trait Observable<T> {
    fn subscriptions(&self) -> &Subscriptions<T>;

    fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubscriptionId
    where
        Self: Sized,
    {
        self.subscriptions().subscribe(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions().unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_order() {
        let hub = Subscriptions::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let log = log.clone();
            hub.subscribe(move |v: &u32| log.borrow_mut().push(format!("{name}{v}")));
        }

        hub.trigger(&1);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_unsubscribe() {
        let hub = Subscriptions::<u32>::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let id = hub.subscribe(move |_| c.set(c.get() + 1));
        hub.trigger(&0);
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.trigger(&0);

        assert_eq!(count.get(), 1);
        assert!(hub.is_empty());
    }

    #[test]
    fn test_unsubscribe_during_trigger_uses_snapshot() {
        let hub = Rc::new(Subscriptions::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let second_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        // First subscriber removes the second one while the trigger is running.
        {
            let hub_ref = Rc::downgrade(&hub);
            let second_id = second_id.clone();
            let log = log.clone();
            hub.subscribe(move |_| {
                log.borrow_mut().push("first");
                if let (Some(hub), Some(id)) = (hub_ref.upgrade(), second_id.get()) {
                    hub.unsubscribe(id);
                }
            });
        }
        {
            let log = log.clone();
            second_id.set(Some(hub.subscribe(move |_| log.borrow_mut().push("second"))));
        }
        {
            let log = log.clone();
            hub.subscribe(move |_| log.borrow_mut().push("third"));
        }

        hub.trigger(&0);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);

        log.borrow_mut().clear();
        hub.trigger(&0);
        assert_eq!(*log.borrow(), vec!["first", "third"]);
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn test_nested_trigger_skips_running_subscriber() {
        let hub = Rc::new(Subscriptions::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let hub_ref = Rc::downgrade(&hub);
            let log = log.clone();
            hub.subscribe(move |v: &u32| {
                log.borrow_mut().push(*v);
                if *v == 0 {
                    if let Some(hub) = hub_ref.upgrade() {
                        hub.trigger(&1);
                    }
                }
            });
        }
        {
            let log = log.clone();
            hub.subscribe(move |v: &u32| log.borrow_mut().push(100 + *v));
        }

        hub.trigger(&0);
        // The nested value 1 reaches only the second subscriber, before the
        // outer value 0 does.
        assert_eq!(*log.borrow(), vec![0, 101, 100]);
    }
}
