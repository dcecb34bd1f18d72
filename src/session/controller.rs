//! The session controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::cards::{CardBoard, CardEvent, CardEventKind, CardState};
use crate::core::{CardId, GameConfig, GameRng, LevelId, Result};
use crate::events::{EventBus, Subscription};
use crate::grid::{deal_pair_ids, level_layout, pick_random_layout, GridLayout};
use crate::resolver::{PairOutcome, PairResolver};
use crate::scoring::ComboScorer;

use super::audio::{AudioCues, Silent};
use super::context::SessionContext;
use super::{Phase, SessionCounters, SessionEvent};

struct SessionState {
    context: SessionContext,
    scorer: ComboScorer,
    counters: SessionCounters,
    phase: Phase,
    level: Option<LevelId>,
    layout: Option<GridLayout>,
    /// Cards in deal order (row-major).
    cards: Vec<CardId>,
    started_at: Instant,
    /// Bumped on every deal; lets a running preview notice a restart.
    game: u64,
    completed: bool,
}

struct Shared {
    config: GameConfig,
    board: CardBoard,
    resolver: PairResolver,
    events: EventBus<SessionEvent>,
    audio: Rc<dyn AudioCues>,
    state: RefCell<SessionState>,
    /// Board and resolver subscriptions for the current game.
    wiring: RefCell<Vec<Subscription>>,
}

/// Owns one game at a time: its board, resolver, score, and counters.
///
/// Cloning yields another handle to the same session. Dealing and flipping
/// spawn local tasks, so the controller must be driven from inside a
/// `tokio::task::LocalSet`.
#[derive(Clone)]
pub struct SessionController {
    shared: Rc<Shared>,
}

impl SessionController {
    /// Create a controller with silent audio.
    pub fn new(config: GameConfig, context: SessionContext) -> Result<Self> {
        Self::with_audio(config, context, Rc::new(Silent))
    }

    /// Create a controller that drives `audio`.
    ///
    /// The progression length always comes from `config.level_count`;
    /// `context` is clamped to it.
    pub fn with_audio(
        config: GameConfig,
        context: SessionContext,
        audio: Rc<dyn AudioCues>,
    ) -> Result<Self> {
        config.validate()?;

        let board = CardBoard::new(config.flip_time());
        let resolver = PairResolver::new(board.clone(), config.mismatch_delay());
        let state = SessionState {
            context: context.with_level_count(config.level_count),
            scorer: ComboScorer::new(config.combo_window),
            counters: SessionCounters::default(),
            phase: Phase::Idle,
            level: None,
            layout: None,
            cards: Vec::new(),
            started_at: Instant::now(),
            game: 0,
            completed: false,
        };

        Ok(Self {
            shared: Rc::new(Shared {
                config,
                board,
                resolver,
                events: EventBus::new(),
                audio,
                state: RefCell::new(state),
                wiring: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Deal `level` from the level table, seeded by the level number.
    pub fn start_level(&self, level: LevelId) -> Result<GridLayout> {
        let layout = level_layout(level)?;
        let mut rng = GameRng::new(u64::from(level.raw()));
        self.state_mut().context.select(level);
        self.deal(layout, &mut rng, Some(level));
        Ok(layout)
    }

    /// Deal a random layout within the configured bounds.
    pub fn start_random_game(&self, rng: &mut GameRng) -> Result<GridLayout> {
        let layout = pick_random_layout(&self.shared.config.layout, rng)?;
        self.deal(layout, rng, None);
        Ok(layout)
    }

    /// Deal a specific layout outside the level progression.
    pub fn start_game(&self, layout: GridLayout, rng: &mut GameRng) {
        self.deal(layout, rng, None);
    }

    /// Show every card for the preview time, then hide them and start play.
    ///
    /// Flips are ignored until the preview ends. Starting a new game while
    /// a preview is running makes the preview stop at its next wait.
    pub async fn run_preview(&self) {
        let (game, cards) = {
            let mut state = self.state_mut();
            if state.phase != Phase::Playing {
                return;
            }
            state.phase = Phase::Preview;
            (state.game, state.cards.clone())
        };
        let board = &self.shared.board;
        let config = &self.shared.config;
        debug!(cards = cards.len(), "preview started");

        for card in &cards {
            board.reveal(*card);
        }
        tokio::time::sleep(config.preview_time()).await;
        if self.current_game() != game {
            return;
        }

        for card in &cards {
            board.hide(*card);
        }
        tokio::time::sleep(config.preview_settle_time()).await;
        if self.current_game() != game {
            return;
        }

        self.shared.resolver.reset_all();
        for card in &cards {
            if board.state(*card) != Some(CardState::Hidden) {
                board.reset_state(*card);
            }
        }
        self.state_mut().phase = Phase::Playing;
        debug!("preview finished");
    }

    /// Player input: start revealing `card`.
    ///
    /// Returns whether the flip was accepted. Flips are refused outside
    /// play, for cards not in the current deal or not face down, and while
    /// `max_concurrent_reveals` unresolved cards are already face up.
    pub fn flip(&self, card: CardId) -> bool {
        if self.phase() != Phase::Playing {
            trace!(%card, "flip ignored: not playing");
            return false;
        }
        let board = &self.shared.board;
        if !board.state(card).is_some_and(CardState::can_reveal) {
            return false;
        }
        if let Some(cap) = self.shared.config.max_concurrent_reveals {
            if self.unresolved_reveals() >= cap {
                trace!(%card, cap, "flip ignored: reveal cap reached");
                return false;
            }
        }
        board.reveal(card);
        true
    }

    /// Cards that are face up (or turning face up) and not yet resolved.
    #[must_use]
    pub fn unresolved_reveals(&self) -> usize {
        let resolver = &self.shared.resolver;
        self.shared.board.count_in(CardState::Revealing)
            + resolver.queue_len()
            + resolver.pending_hide_len()
    }

    /// Cancel the resolver's work: its cycle and every pending hide.
    pub fn reset_all(&self) {
        self.shared.resolver.reset_all();
    }

    /// Attach a handler for session events.
    #[must_use = "dropping the Subscription immediately unsubscribes the handler"]
    pub fn subscribe(&self, handler: impl Fn(&SessionEvent) + 'static) -> Subscription {
        self.shared.events.subscribe(handler)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn board(&self) -> &CardBoard {
        &self.shared.board
    }

    #[must_use]
    pub fn resolver(&self) -> &PairResolver {
        &self.shared.resolver
    }

    /// Current progress snapshot.
    #[must_use]
    pub fn context(&self) -> SessionContext {
        self.state().context.clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// Level being played, `None` for games outside the progression.
    #[must_use]
    pub fn level(&self) -> Option<LevelId> {
        self.state().level
    }

    #[must_use]
    pub fn layout(&self) -> Option<GridLayout> {
        self.state().layout
    }

    /// Cards of the current deal, row-major.
    #[must_use]
    pub fn cards(&self) -> Vec<CardId> {
        self.state().cards.clone()
    }

    #[must_use]
    pub fn counters(&self) -> SessionCounters {
        self.state().counters
    }

    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        self.state().counters.matched_pairs
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.state().counters.total_pairs
    }

    #[must_use]
    pub fn pairs_left(&self) -> usize {
        self.state().counters.pairs_left()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state().scorer.score()
    }

    #[must_use]
    pub fn combo(&self) -> u32 {
        self.state().scorer.combo()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state().completed
    }

    fn state(&self) -> std::cell::Ref<'_, SessionState> {
        self.shared.state.borrow()
    }

    fn state_mut(&self) -> std::cell::RefMut<'_, SessionState> {
        self.shared.state.borrow_mut()
    }

    fn current_game(&self) -> u64 {
        self.state().game
    }

    fn deal(&self, layout: GridLayout, rng: &mut GameRng, level: Option<LevelId>) {
        // Old handlers go first so nothing from the previous game can reach
        // the new counters.
        self.shared.wiring.borrow_mut().clear();
        self.shared.resolver.reset_all();

        let board = &self.shared.board;
        board.release_all();
        let cards: Vec<CardId> = deal_pair_ids(layout, rng)
            .into_iter()
            .map(|pair_id| board.spawn(Some(pair_id)))
            .collect();

        let (game, counters) = {
            let mut state = self.state_mut();
            state.scorer.reset_score();
            state.counters = SessionCounters {
                total_pairs: layout.pairs(),
                matched_pairs: 0,
            };
            state.phase = Phase::Playing;
            state.level = level;
            state.layout = Some(layout);
            state.cards = cards;
            state.started_at = Instant::now();
            state.game += 1;
            state.completed = false;
            (state.game, state.counters)
        };

        *self.shared.wiring.borrow_mut() = self.wire();

        info!(%layout, ?level, pairs = layout.pairs(), "game started");
        self.emit_for_game(
            game,
            &[SessionEvent::ScoreChanged(0), SessionEvent::PairsChanged(counters)],
        );
    }

    fn wire(&self) -> Vec<Subscription> {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let on_card = board_handler(weak.clone());
        let on_pair = move |outcome: &PairOutcome| {
            if let Some(shared) = weak.upgrade() {
                SessionController { shared }.on_pair_resolved(outcome);
            }
        };

        vec![
            self.shared.board.subscribe(on_card),
            self.shared.resolver.subscribe(on_pair),
        ]
    }

    fn on_card_revealed(&self, card: CardId) {
        if self.phase() != Phase::Playing {
            return;
        }
        self.shared.resolver.enqueue(card);
        self.shared.audio.flip();
    }

    fn on_pair_resolved(&self, outcome: &PairOutcome) {
        let audio = &self.shared.audio;
        if !outcome.is_match {
            audio.mismatched();
            return;
        }

        let mut pending: SmallVec<[SessionEvent; 4]> = SmallVec::new();
        let (game, finished) = {
            let mut state = self.state_mut();
            let game = state.game;
            state.counters.matched_pairs += 1;
            let now = state.started_at.elapsed().as_secs_f64();
            let change = state.scorer.register_match(now);
            debug!(gained = change.gained, score = change.score, combo = change.combo, "match scored");

            pending.push(SessionEvent::ScoreChanged(change.score));
            pending.push(SessionEvent::PairsChanged(state.counters));

            let all_matched = state.counters.matched_pairs >= state.counters.total_pairs;
            if all_matched && !state.completed {
                state.completed = true;
                state.phase = Phase::Complete;
                let level = state.level;
                pending.push(SessionEvent::LevelComplete { level, score: change.score });
                if let Some(unlocked) = level.and_then(|l| state.context.unlock_after(l)) {
                    pending.push(SessionEvent::LevelUnlocked(unlocked));
                }
                info!(?level, score = change.score, "level complete");
                (game, true)
            } else {
                (game, false)
            }
        };

        audio.matched();
        if finished {
            audio.level_complete();
        }
        self.emit_for_game(game, &pending);
    }

    /// Emit `events` in order, stopping if a handler starts a new game.
    fn emit_for_game(&self, game: u64, events: &[SessionEvent]) {
        for event in events {
            if self.current_game() != game {
                debug!(game, "dropping events of a replaced game");
                return;
            }
            self.shared.events.emit(event);
        }
    }
}

fn board_handler(weak: Weak<Shared>) -> impl Fn(&CardEvent) + 'static {
    move |event: &CardEvent| {
        if event.kind != CardEventKind::Revealed {
            return;
        }
        if let Some(shared) = weak.upgrade() {
            SessionController { shared }.on_card_revealed(event.card);
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SessionController")
            .field("phase", &state.phase)
            .field("level", &state.level)
            .field("counters", &state.counters)
            .field("score", &state.scorer.score())
            .finish()
    }
}
