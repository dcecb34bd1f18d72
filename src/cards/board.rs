//! The card board: slot storage, pooling, and timed flips.
//!
//! The board owns every card's storage. Cards are dealt into slots with
//! [`CardBoard::spawn`] and returned with [`CardBoard::release`]; released
//! slots are reused by later deals, and each reuse bumps the slot generation
//! so stale [`CardId`]s stop resolving.
//!
//! ## Scheduling
//!
//! Flips run as local tasks (`tokio::task::spawn_local`), so `reveal` and
//! `hide` must be called from inside a `tokio::task::LocalSet`. A flip
//! sleeps for the configured flip time and only then moves the card to its
//! resting state and emits the matching [`CardEvent`]. Nothing is borrowed
//! across the sleep or while events are dispatched.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

use crate::core::{CardId, PairId};
use crate::events::{EventBus, Subscription};

use super::state::{Card, CardState};

/// What happened to a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardEventKind {
    /// Finished flipping face up.
    Revealed,
    /// Finished flipping face down.
    Hidden,
    /// Retired as part of a match.
    Matched,
}

/// Notification emitted by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardEvent {
    pub card: CardId,
    pub kind: CardEventKind,
    /// When the transition completed.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    card: Option<Card>,
    flip: Option<AbortHandle>,
}

impl Slot {
    fn cancel_flip(&mut self) {
        if let Some(flip) = self.flip.take() {
            flip.abort();
        }
    }
}

#[derive(Debug, Default)]
struct BoardInner {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BoardInner {
    fn slot_mut(&mut self, id: CardId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.slot() as usize)
            .filter(|slot| slot.generation == id.generation() && slot.card.is_some())
    }

    fn card(&self, id: CardId) -> Option<&Card> {
        self.slots
            .get(id.slot() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.card.as_ref())
    }
}

/// Shared handle to the board. Clones refer to the same cards.
#[derive(Clone, Debug)]
pub struct CardBoard {
    inner: Rc<RefCell<BoardInner>>,
    events: EventBus<CardEvent>,
    flip_time: Duration,
}

impl CardBoard {
    /// Create an empty board whose flips take `flip_time`.
    pub fn new(flip_time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BoardInner::default())),
            events: EventBus::new(),
            flip_time,
        }
    }

    /// Deal a face-down card, reusing a released slot when one exists.
    pub fn spawn(&self, pair_id: Option<PairId>) -> CardId {
        let mut inner = self.inner.borrow_mut();
        let slot_index = match inner.free.pop() {
            Some(index) => index,
            None => {
                inner.slots.push(Slot::default());
                (inner.slots.len() - 1) as u32
            }
        };

        let slot = &mut inner.slots[slot_index as usize];
        slot.card = Some(Card::new(pair_id));
        CardId::new(slot_index, slot.generation)
    }

    /// Return a card to the pool. Its handle becomes absent.
    pub fn release(&self, id: CardId) {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slot_mut(id) else {
            return;
        };
        slot.cancel_flip();
        slot.card = None;
        slot.generation = slot.generation.wrapping_add(1);
        inner.free.push(id.slot());
    }

    /// Return every card to the pool.
    pub fn release_all(&self) {
        for id in self.card_ids() {
            self.release(id);
        }
    }

    /// Handles of every card on the board, in slot order.
    #[must_use]
    pub fn card_ids(&self) -> Vec<CardId> {
        self.inner
            .borrow()
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.card.is_some())
            .map(|(index, slot)| CardId::new(index as u32, slot.generation))
            .collect()
    }

    /// Number of cards on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.iter().filter(|s| s.card.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots allocated so far, including pooled ones.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Snapshot of a card, or `None` if the handle is absent.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<Card> {
        self.inner.borrow().card(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn state(&self, id: CardId) -> Option<CardState> {
        self.get(id).map(|card| card.state)
    }

    #[must_use]
    pub fn pair_id(&self, id: CardId) -> Option<PairId> {
        self.get(id).and_then(|card| card.pair_id)
    }

    #[must_use]
    pub fn is_matched(&self, id: CardId) -> bool {
        self.state(id).is_some_and(CardState::is_matched)
    }

    /// Number of cards currently in `state`.
    #[must_use]
    pub fn count_in(&self, state: CardState) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.card.is_some_and(|card| card.state == state))
            .count()
    }

    /// Start flipping a card face up.
    ///
    /// No-op for absent, matched, revealed, or already revealing cards. A
    /// card that is mid-hide turns around; its `Hidden` event never fires.
    pub fn reveal(&self, id: CardId) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.slot_mut(id) else {
                trace!(%id, "reveal ignored: card absent");
                return;
            };
            let Some(card) = slot.card.as_mut() else {
                return;
            };
            if !card.state.can_reveal() {
                trace!(%id, state = %card.state, "reveal ignored");
                return;
            }
            card.state = CardState::Revealing;
            slot.cancel_flip();
        }
        self.start_flip(id, CardState::Revealed);
    }

    /// Start flipping a revealed card face down. No-op in any other state.
    pub fn hide(&self, id: CardId) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(card) = inner.slot_mut(id).and_then(|slot| slot.card.as_mut()) else {
                trace!(%id, "hide ignored: card absent");
                return;
            };
            if !card.state.can_hide() {
                trace!(%id, state = %card.state, "hide ignored");
                return;
            }
            card.state = CardState::Hiding;
        }
        self.start_flip(id, CardState::Hidden);
    }

    /// Retire a card. Idempotent; emits `Matched` only on the first call.
    pub fn mark_matched(&self, id: CardId) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.slot_mut(id) else {
                return;
            };
            let Some(card) = slot.card.as_mut() else {
                return;
            };
            if card.state.is_matched() {
                return;
            }
            card.state = CardState::Matched;
            slot.cancel_flip();
        }
        self.emit(id, CardEventKind::Matched);
    }

    /// Cancel any flip in flight and force the card face down.
    pub fn reset_state(&self, id: CardId) {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slot_mut(id) else {
            return;
        };
        slot.cancel_flip();
        if let Some(card) = slot.card.as_mut() {
            card.state = CardState::Hidden;
        }
    }

    /// Attach a handler for card events.
    #[must_use = "dropping the Subscription immediately unsubscribes the handler"]
    pub fn subscribe(&self, handler: impl Fn(&CardEvent) + 'static) -> Subscription {
        self.events.subscribe(handler)
    }

    fn start_flip(&self, id: CardId, target: CardState) {
        let board = self.clone();
        let flip_time = self.flip_time;
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(flip_time).await;
            board.finish_flip(id, target);
        });

        if let Some(slot) = self.inner.borrow_mut().slot_mut(id) {
            slot.flip = Some(task.abort_handle());
        } else {
            task.abort();
        }
    }

    fn finish_flip(&self, id: CardId, target: CardState) {
        let kind = {
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.slot_mut(id) else {
                return;
            };
            slot.flip = None;
            let Some(card) = slot.card.as_mut() else {
                return;
            };
            match (card.state, target) {
                (CardState::Revealing, CardState::Revealed) => {
                    card.state = CardState::Revealed;
                    CardEventKind::Revealed
                }
                (CardState::Hiding, CardState::Hidden) => {
                    card.state = CardState::Hidden;
                    CardEventKind::Hidden
                }
                _ => return,
            }
        };
        self.emit(id, kind);
    }

    fn emit(&self, card: CardId, kind: CardEventKind) {
        trace!(%card, ?kind, "card event");
        self.events.emit(&CardEvent { card, kind, at: Instant::now() });
    }
}
