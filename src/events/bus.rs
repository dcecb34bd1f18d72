//! Single-threaded publish/subscribe bus.
//!
//! Handlers are invoked synchronously in subscription order. The handler list
//! is snapshotted before dispatch, so a handler may subscribe, unsubscribe,
//! or emit again without tripping a `RefCell` borrow.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

/// Identifier of one subscription on one bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    next_id: u32,
}

impl<E> Registry<E> {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }
}

/// A cloneable handle to a set of subscribers for events of type `E`.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use pairflip::events::EventBus;
///
/// let bus = EventBus::<u32>::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let sink = seen.clone();
/// let sub = bus.subscribe(move |v| sink.set(sink.get() + *v));
///
/// bus.emit(&5);
/// drop(sub);
/// bus.emit(&5);
/// assert_eq!(seen.get(), 5);
/// ```
pub struct EventBus<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self { registry: Rc::clone(&self.registry) }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.registry.borrow().handlers.len())
            .finish()
    }
}

impl<E: 'static> EventBus<E> {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry { handlers: Vec::new(), next_id: 0 })),
        }
    }

    /// Attach a handler. It stays attached until the returned
    /// [`Subscription`] is dropped or cancelled.
    #[must_use = "dropping the Subscription immediately unsubscribes the handler"]
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = SubscriptionId(registry.next_id);
            registry.next_id += 1;
            registry.handlers.push((id, Rc::new(handler)));
            id
        };

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `event` to every current subscriber.
    pub fn emit(&self, event: &E) {
        let snapshot: SmallVec<[Handler<E>; 4]> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            (*handler)(event);
        }
    }

    /// Number of attached handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

/// RAII guard for a bus subscription.
///
/// Dropping the guard detaches the handler. A guard outliving its bus is
/// harmless.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// The subscription's ID on its bus.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Detach the handler now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
