//! In-process event plumbing.
//!
//! Every producer in the crate (the card board, the pair resolver, the
//! session controller) exposes an [`EventBus`] of its own event type.
//! Consumers attach with `subscribe` and hold the returned [`Subscription`];
//! dropping it detaches the handler, which is how a session makes sure a
//! restart never leaves a stale handler behind.

mod bus;

pub use bus::{EventBus, Subscription, SubscriptionId};
