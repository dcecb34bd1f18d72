//! Queue-based pair resolver.
//!
//! Revealed cards are queued in completion order. A consumer task drains
//! the queue two cards at a time, resolves each pair, emits a
//! [`PairOutcome`], and yields once per pair so reveals finishing in the
//! meantime land in the queue before the loop checks it again. Mismatched
//! pairs are parked in `pending_hide` until their hide timer fires.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use crate::cards::CardBoard;
use crate::core::CardId;
use crate::events::{EventBus, Subscription};

use super::PairOutcome;

#[derive(Debug, Default)]
struct ResolverInner {
    /// Revealed cards waiting for a partner, oldest first.
    queue: VecDeque<CardId>,

    /// Mismatched cards whose hide timer has not fired yet.
    pending_hide: FxHashSet<CardId>,

    /// True while a consumption cycle is active.
    running: bool,

    consumer: Option<AbortHandle>,

    hide_timers: Vec<AbortHandle>,
}

/// Turns a stream of revealed cards into pair outcomes.
///
/// Cloning yields another handle to the same resolver. All methods must be
/// called from inside a `tokio::task::LocalSet`.
#[derive(Clone, Debug)]
pub struct PairResolver {
    inner: Rc<RefCell<ResolverInner>>,
    board: CardBoard,
    outcomes: EventBus<PairOutcome>,
    mismatch_delay: Duration,
}

impl PairResolver {
    /// Create a resolver for `board` that hides mismatches after
    /// `mismatch_delay`.
    pub fn new(board: CardBoard, mismatch_delay: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ResolverInner::default())),
            board,
            outcomes: EventBus::new(),
            mismatch_delay,
        }
    }

    /// The board this resolver acts on.
    #[must_use]
    pub fn board(&self) -> &CardBoard {
        &self.board
    }

    /// Attach a handler for pair outcomes.
    #[must_use = "dropping the Subscription immediately unsubscribes the handler"]
    pub fn subscribe(&self, handler: impl Fn(&PairOutcome) + 'static) -> Subscription {
        self.outcomes.subscribe(handler)
    }

    /// Queue a card that finished revealing.
    ///
    /// Silently ignored when the card is absent, already matched, already
    /// queued, or waiting to be hidden. Starts a consumption cycle if none
    /// is active.
    pub fn enqueue(&self, card: CardId) {
        let Some(state) = self.board.state(card) else {
            trace!(%card, "enqueue ignored: card absent");
            return;
        };
        if state.is_matched() {
            trace!(%card, "enqueue ignored: already matched");
            return;
        }

        let start_cycle = {
            let mut inner = self.inner.borrow_mut();
            if inner.queue.contains(&card) {
                trace!(%card, "enqueue ignored: already queued");
                return;
            }
            if inner.pending_hide.contains(&card) {
                trace!(%card, "enqueue ignored: pending hide");
                return;
            }
            inner.queue.push_back(card);
            !std::mem::replace(&mut inner.running, true)
        };

        if start_cycle {
            self.start_cycle();
        }
    }

    /// Cancel the consumption cycle and every hide timer, and forget all
    /// queued and pending cards.
    ///
    /// Cards the resolver was still holding are snapped face down, so a
    /// cancelled hide can never leave a card stranded face up.
    pub fn reset_all(&self) {
        let stranded: Vec<CardId> = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if let Some(consumer) = inner.consumer.take() {
                consumer.abort();
            }
            for timer in inner.hide_timers.drain(..) {
                timer.abort();
            }
            inner.running = false;
            let queued = inner.queue.drain(..);
            let pending = inner.pending_hide.drain();
            queued.chain(pending).collect()
        };

        for card in &stranded {
            if !self.board.is_matched(*card) {
                self.board.reset_state(*card);
            }
        }
        debug!(stranded = stranded.len(), "resolver reset");
    }

    /// Number of cards waiting for a partner.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Waiting cards, oldest first.
    #[must_use]
    pub fn queued(&self) -> Vec<CardId> {
        self.inner.borrow().queue.iter().copied().collect()
    }

    #[must_use]
    pub fn is_pending_hide(&self, card: CardId) -> bool {
        self.inner.borrow().pending_hide.contains(&card)
    }

    #[must_use]
    pub fn pending_hide_len(&self) -> usize {
        self.inner.borrow().pending_hide.len()
    }

    /// True while a consumption cycle is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Hide timers that have not fired or been cancelled.
    #[must_use]
    pub fn hides_in_flight(&self) -> usize {
        self.inner
            .borrow()
            .hide_timers
            .iter()
            .filter(|timer| !timer.is_finished())
            .count()
    }

    fn start_cycle(&self) {
        let resolver = self.clone();
        let task = tokio::task::spawn_local(async move { resolver.run_cycle().await });
        self.inner.borrow_mut().consumer = Some(task.abort_handle());
    }

    async fn run_cycle(self) {
        while let Some((first, second)) = self.next_pair() {
            self.resolve(first, second);
            tokio::task::yield_now().await;
        }
    }

    /// Dequeue the two oldest cards, or end the cycle if fewer remain.
    fn next_pair(&self) -> Option<(CardId, CardId)> {
        let mut inner = self.inner.borrow_mut();
        if inner.queue.len() < 2 {
            inner.running = false;
            inner.consumer = None;
            return None;
        }
        let first = inner.queue.pop_front()?;
        let second = inner.queue.pop_front()?;
        Some((first, second))
    }

    fn resolve(&self, first: CardId, second: CardId) {
        let (Some(a), Some(b)) = (self.board.get(first), self.board.get(second)) else {
            debug!(%first, %second, "pair discarded: card absent");
            return;
        };
        if first == second || a.state.is_matched() || b.state.is_matched() {
            debug!(%first, %second, "pair discarded: stale");
            return;
        }

        let is_match = a.matches(&b);
        if is_match {
            self.board.mark_matched(first);
            self.board.mark_matched(second);
        } else {
            {
                let mut inner = self.inner.borrow_mut();
                inner.pending_hide.insert(first);
                inner.pending_hide.insert(second);
            }
            // Scheduled before the outcome goes out so a reset issued by a
            // subscriber cancels it too.
            self.schedule_hide(first, second);
        }

        debug!(%first, %second, is_match, "pair resolved");
        self.outcomes.emit(&PairOutcome { first, second, is_match });
    }

    fn schedule_hide(&self, first: CardId, second: CardId) {
        let resolver = self.clone();
        let delay = self.mismatch_delay;
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            resolver.finish_hide(first, second);
        });

        let mut inner = self.inner.borrow_mut();
        inner.hide_timers.retain(|timer| !timer.is_finished());
        inner.hide_timers.push(task.abort_handle());
    }

    fn finish_hide(&self, first: CardId, second: CardId) {
        for card in [first, second] {
            if !self.board.is_matched(card) {
                self.board.hide(card);
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.pending_hide.remove(&first);
        inner.pending_hide.remove(&second);
    }
}
