//! Session controller integration tests.
//!
//! These play whole levels on a paused clock: dealing, flipping, scoring,
//! completion, restarts, the preview, and audio cues.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use pairflip::{
    AudioCues, CardId, CardState, GameConfig, GameRng, GridLayout, LevelId, PairId, Phase,
    SessionContext, SessionController, SessionCounters, SessionEvent, Subscription,
};
use tokio::task::LocalSet;
use tokio::time::sleep;

const FLIP: Duration = Duration::from_millis(125);
const DELAY: Duration = Duration::from_millis(500);
const TICK: Duration = Duration::from_millis(1);

fn config() -> GameConfig {
    GameConfig::new()
        .with_flip_duration(0.125)
        .with_mismatch_reveal_delay(0.5)
        .with_combo_window(2.0)
        .with_preview(1.0, 0.25)
}

fn session(config: GameConfig) -> SessionController {
    SessionController::new(config, SessionContext::new(10)).unwrap()
}

fn record(session: &SessionController) -> (Rc<RefCell<Vec<SessionEvent>>>, Subscription) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let sub = session.subscribe(move |event| sink.borrow_mut().push(*event));
    (events, sub)
}

/// The dealt cards grouped by pair, in first-seen order.
fn pairs_of(session: &SessionController) -> Vec<[CardId; 2]> {
    let mut order: Vec<PairId> = Vec::new();
    let mut by_pair: HashMap<PairId, Vec<CardId>> = HashMap::new();
    for card in session.cards() {
        let pair_id = session.board().pair_id(card).unwrap();
        if !by_pair.contains_key(&pair_id) {
            order.push(pair_id);
        }
        by_pair.entry(pair_id).or_default().push(card);
    }
    order
        .iter()
        .map(|id| {
            let cards = &by_pair[id];
            assert_eq!(cards.len(), 2);
            [cards[0], cards[1]]
        })
        .collect()
}

async fn flip_pair(session: &SessionController, pair: [CardId; 2]) {
    assert!(session.flip(pair[0]));
    assert!(session.flip(pair[1]));
    sleep(FLIP + TICK).await;
}

async fn play_to_completion(session: &SessionController) {
    for pair in pairs_of(session) {
        flip_pair(session, pair).await;
    }
}

fn count(events: &Rc<RefCell<Vec<SessionEvent>>>, pred: impl Fn(&SessionEvent) -> bool) -> usize {
    events.borrow().iter().filter(|e| pred(e)).count()
}

fn is_complete_event(event: &SessionEvent) -> bool {
    matches!(event, SessionEvent::LevelComplete { .. })
}

#[derive(Default)]
struct RecordingAudio {
    flips: Cell<usize>,
    matches: Cell<usize>,
    mismatches: Cell<usize>,
    completions: Cell<usize>,
}

impl AudioCues for RecordingAudio {
    fn flip(&self) {
        self.flips.set(self.flips.get() + 1);
    }

    fn matched(&self) {
        self.matches.set(self.matches.get() + 1);
    }

    fn mismatched(&self) {
        self.mismatches.set(self.mismatches.get() + 1);
    }

    fn level_complete(&self) {
        self.completions.set(self.completions.get() + 1);
    }
}

// =============================================================================
// Dealing Tests
// =============================================================================

/// Starting a level announces a zero score and the pair totals.
#[tokio::test(start_paused = true)]
async fn test_start_level_announces_reset() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            let (events, _sub) = record(&session);

            let layout = session.start_level(LevelId::new(1)).unwrap();
            assert_eq!(layout, GridLayout::new(2, 2).unwrap());
            assert_eq!(
                *events.borrow(),
                vec![
                    SessionEvent::ScoreChanged(0),
                    SessionEvent::PairsChanged(SessionCounters { total_pairs: 2, matched_pairs: 0 }),
                ]
            );
            assert_eq!(session.context().selected(), LevelId::new(1));
            assert!(session
                .cards()
                .iter()
                .all(|c| session.board().state(*c) == Some(CardState::Hidden)));
        })
        .await;
}

/// Level deals are seeded by the level number.
#[tokio::test(start_paused = true)]
async fn test_level_deal_is_reproducible() {
    LocalSet::new()
        .run_until(async {
            let first = session(config());
            let second = session(config());
            first.start_level(LevelId::new(6)).unwrap();
            second.start_level(LevelId::new(6)).unwrap();

            let ids = |s: &SessionController| -> Vec<Option<PairId>> {
                s.cards().iter().map(|c| s.board().pair_id(*c)).collect()
            };
            assert_eq!(ids(&first), ids(&second));
            assert_eq!(first.total_pairs(), 8);
        })
        .await;
}

/// Random games stay inside the configured bounds and outside the progression.
#[tokio::test(start_paused = true)]
async fn test_random_game_has_no_level() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            let (events, _sub) = record(&session);
            let mut rng = GameRng::new(3);

            let layout = session.start_random_game(&mut rng).unwrap();
            assert!(layout.cells() <= 30);
            assert_eq!(layout.cells() % 2, 0);
            assert_eq!(session.level(), None);

            play_to_completion(&session).await;
            assert!(events
                .borrow()
                .contains(&SessionEvent::LevelComplete { level: None, score: session.score() }));
            assert_eq!(count(&events, |e| matches!(e, SessionEvent::LevelUnlocked(_))), 0);
        })
        .await;
}

// =============================================================================
// Completion Tests
// =============================================================================

/// Matching every pair completes the level once and unlocks the next one.
#[tokio::test(start_paused = true)]
async fn test_level_completes_exactly_once() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            let (events, _sub) = record(&session);
            session.start_level(LevelId::new(1)).unwrap();

            play_to_completion(&session).await;

            // Both matches land well inside the combo window: 2 + 4.
            assert_eq!(session.score(), 6);
            assert_eq!(session.combo(), 2);
            assert_eq!(session.phase(), Phase::Complete);
            assert!(session.is_complete());
            assert_eq!(session.pairs_left(), 0);
            assert_eq!(count(&events, is_complete_event), 1);
            assert!(events
                .borrow()
                .contains(&SessionEvent::LevelComplete { level: Some(LevelId::new(1)), score: 6 }));
            assert!(events.borrow().contains(&SessionEvent::LevelUnlocked(LevelId::new(2))));
            assert_eq!(session.context().unlocked(), LevelId::new(2));

            // Nothing more is accepted once the level is done.
            assert!(!session.flip(session.cards()[0]));
            sleep(DELAY * 2).await;
            assert_eq!(count(&events, is_complete_event), 1);
        })
        .await;
}

/// Matches spaced beyond the combo window score base points only.
#[tokio::test(start_paused = true)]
async fn test_slow_matches_score_base_points() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            session.start_level(LevelId::new(1)).unwrap();
            let pairs = pairs_of(&session);

            flip_pair(&session, pairs[0]).await;
            assert_eq!(session.score(), 2);

            sleep(Duration::from_secs(3)).await;
            flip_pair(&session, pairs[1]).await;
            assert_eq!(session.score(), 4);
            assert_eq!(session.combo(), 1);
        })
        .await;
}

/// Finishing the last level unlocks nothing.
#[tokio::test(start_paused = true)]
async fn test_last_level_unlocks_nothing() {
    LocalSet::new()
        .run_until(async {
            let session = SessionController::new(
                config(),
                SessionContext::with_unlocked(10, LevelId::new(10)),
            )
            .unwrap();
            let (events, _sub) = record(&session);

            session.start_level(LevelId::new(10)).unwrap();
            assert_eq!(session.total_pairs(), 15);
            play_to_completion(&session).await;

            assert_eq!(count(&events, is_complete_event), 1);
            assert_eq!(count(&events, |e| matches!(e, SessionEvent::LevelUnlocked(_))), 0);
        })
        .await;
}

/// The configured level count bounds the progression, whatever context is passed in.
#[tokio::test(start_paused = true)]
async fn test_configured_level_count_bounds_unlocks() {
    LocalSet::new()
        .run_until(async {
            let session =
                SessionController::new(config().with_level_count(1), SessionContext::default())
                    .unwrap();
            let (events, _sub) = record(&session);
            assert_eq!(session.context().level_count(), 1);

            session.start_level(LevelId::FIRST).unwrap();
            play_to_completion(&session).await;

            assert_eq!(count(&events, is_complete_event), 1);
            assert_eq!(count(&events, |e| matches!(e, SessionEvent::LevelUnlocked(_))), 0);
            assert_eq!(session.context().unlocked(), LevelId::FIRST);
        })
        .await;
}

// =============================================================================
// Flip Input Tests
// =============================================================================

/// Flips are refused for cards that are already up or not in the deal.
#[tokio::test(start_paused = true)]
async fn test_flip_guards() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            session.start_level(LevelId::new(2)).unwrap();
            let card = session.cards()[0];

            assert!(session.flip(card));
            assert!(!session.flip(card));
            sleep(FLIP + TICK).await;
            assert!(!session.flip(card));

            let stale = CardId::new(card.slot(), card.generation() + 1);
            assert!(!session.flip(stale));
        })
        .await;
}

/// Flipping continues while a mismatch is waiting to hide.
#[tokio::test(start_paused = true)]
async fn test_input_not_locked_during_mismatch() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            session.start_level(LevelId::new(2)).unwrap();
            let pairs = pairs_of(&session);

            flip_pair(&session, [pairs[0][0], pairs[1][0]]).await;
            assert_eq!(session.resolver().pending_hide_len(), 2);

            flip_pair(&session, pairs[2]).await;
            assert_eq!(session.matched_pairs(), 1);
            assert_eq!(session.board().state(pairs[0][0]), Some(CardState::Revealed));

            sleep(DELAY + FLIP).await;
            assert_eq!(session.board().state(pairs[0][0]), Some(CardState::Hidden));
            assert_eq!(session.board().state(pairs[1][0]), Some(CardState::Hidden));
        })
        .await;
}

/// With a reveal cap, flips beyond it are refused until the held cards resolve.
#[tokio::test(start_paused = true)]
async fn test_reveal_cap_limits_unresolved_cards() {
    LocalSet::new()
        .run_until(async {
            let session = session(config().with_max_concurrent_reveals(2));
            session.start_level(LevelId::new(2)).unwrap();
            let pairs = pairs_of(&session);

            // Mismatch: both cards stay held until the hide fires.
            assert!(session.flip(pairs[0][0]));
            assert!(session.flip(pairs[1][0]));
            assert!(!session.flip(pairs[2][0]));
            assert_eq!(session.unresolved_reveals(), 2);

            sleep(FLIP + TICK).await;
            assert!(!session.flip(pairs[2][0]));

            sleep(DELAY).await;
            assert_eq!(session.unresolved_reveals(), 0);
            assert!(session.flip(pairs[2][0]));
            assert!(session.flip(pairs[2][1]));
            sleep(FLIP + TICK).await;

            // A match releases the cap straight away.
            assert_eq!(session.matched_pairs(), 1);
            assert!(session.flip(pairs[0][0]));
        })
        .await;
}

// =============================================================================
// Restart Tests
// =============================================================================

/// Restarting repeatedly never stacks handlers: one match counts once.
#[tokio::test(start_paused = true)]
async fn test_restarts_do_not_duplicate_handlers() {
    LocalSet::new()
        .run_until(async {
            let audio = Rc::new(RecordingAudio::default());
            let session =
                SessionController::with_audio(config(), SessionContext::new(10), audio.clone())
                    .unwrap();
            let (events, _sub) = record(&session);

            for _ in 0..3 {
                session.start_level(LevelId::new(1)).unwrap();
            }
            assert_eq!(session.board().len(), 4);

            play_to_completion(&session).await;
            assert_eq!(session.matched_pairs(), 2);
            assert_eq!(session.score(), 6);
            assert_eq!(audio.matches.get(), 2);
            assert_eq!(audio.flips.get(), 4);
            assert_eq!(count(&events, is_complete_event), 1);
        })
        .await;
}

/// Restarting mid-game resets score and counters and strands no card face up.
#[tokio::test(start_paused = true)]
async fn test_restart_mid_game_leaves_no_stuck_cards() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            let (events, _sub) = record(&session);
            session.start_level(LevelId::new(2)).unwrap();
            let pairs = pairs_of(&session);

            flip_pair(&session, pairs[0]).await;
            flip_pair(&session, [pairs[1][0], pairs[2][0]]).await;
            assert!(session.flip(pairs[1][1]));
            assert_eq!(session.score(), 2);

            let old = session.cards();
            events.borrow_mut().clear();
            session.start_level(LevelId::new(2)).unwrap();

            assert_eq!(session.score(), 0);
            assert_eq!(session.matched_pairs(), 0);
            assert_eq!(events.borrow()[0], SessionEvent::ScoreChanged(0));
            assert!(old.iter().all(|c| !session.board().contains(*c)));
            assert_eq!(session.resolver().queue_len(), 0);
            assert_eq!(session.resolver().pending_hide_len(), 0);

            sleep(DELAY + FLIP * 2).await;
            assert_eq!(session.board().count_in(CardState::Hidden), session.cards().len());
            assert_eq!(session.board().count_in(CardState::Revealed), 0);
            assert_eq!(session.resolver().queue_len(), 0);
        })
        .await;
}

/// A handler that starts the next level mid-dispatch never sees the old game's counters afterwards.
#[tokio::test(start_paused = true)]
async fn test_restart_from_handler_drops_stale_events() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            let (events, _sub) = record(&session);

            let advanced = Rc::new(Cell::new(false));
            let _advance = {
                let next = session.clone();
                let advanced = advanced.clone();
                session.subscribe(move |event| {
                    if let SessionEvent::ScoreChanged(score) = event {
                        if *score > 0 && !advanced.get() {
                            advanced.set(true);
                            next.start_level(LevelId::new(2)).unwrap();
                        }
                    }
                })
            };

            session.start_level(LevelId::new(1)).unwrap();
            events.borrow_mut().clear();
            let pairs = pairs_of(&session);
            flip_pair(&session, pairs[0]).await;

            assert!(advanced.get());
            let fresh = SessionCounters { total_pairs: 3, matched_pairs: 0 };
            assert_eq!(
                *events.borrow(),
                vec![
                    SessionEvent::ScoreChanged(2),
                    SessionEvent::ScoreChanged(0),
                    SessionEvent::PairsChanged(fresh),
                ]
            );
            assert_eq!(session.counters(), fresh);
            assert_eq!(session.board().len(), 6);
            assert_eq!(session.score(), 0);
        })
        .await;
}

// =============================================================================
// Preview Tests
// =============================================================================

/// The preview shows every card, ignores flips, and hands over a face-down board.
#[tokio::test(start_paused = true)]
async fn test_preview_shows_then_hides_everything() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            session.start_level(LevelId::new(1)).unwrap();
            let cards = session.cards();

            let preview = tokio::task::spawn_local({
                let session = session.clone();
                async move { session.run_preview().await }
            });
            sleep(TICK).await;
            assert_eq!(session.phase(), Phase::Preview);
            assert!(!session.flip(cards[0]));

            sleep(FLIP).await;
            assert_eq!(session.board().count_in(CardState::Revealed), cards.len());
            assert_eq!(session.resolver().queue_len(), 0);
            assert_eq!(session.matched_pairs(), 0);

            preview.await.unwrap();
            assert_eq!(session.phase(), Phase::Playing);
            assert_eq!(session.board().count_in(CardState::Hidden), cards.len());
            assert_eq!(session.score(), 0);
            assert!(session.flip(cards[0]));
        })
        .await;
}

/// Starting a new game during the preview abandons it.
#[tokio::test(start_paused = true)]
async fn test_restart_during_preview() {
    LocalSet::new()
        .run_until(async {
            let session = session(config());
            session.start_level(LevelId::new(1)).unwrap();

            let preview = tokio::task::spawn_local({
                let session = session.clone();
                async move { session.run_preview().await }
            });
            sleep(Duration::from_millis(500)).await;

            session.start_level(LevelId::new(2)).unwrap();
            assert_eq!(session.phase(), Phase::Playing);

            preview.await.unwrap();
            assert_eq!(session.phase(), Phase::Playing);
            assert_eq!(session.board().count_in(CardState::Hidden), 6);
        })
        .await;
}

// =============================================================================
// Audio Tests
// =============================================================================

/// Each cue fires once per triggering event.
#[tokio::test(start_paused = true)]
async fn test_audio_cues() {
    LocalSet::new()
        .run_until(async {
            let audio = Rc::new(RecordingAudio::default());
            let session =
                SessionController::with_audio(config(), SessionContext::new(10), audio.clone())
                    .unwrap();
            session.start_level(LevelId::new(1)).unwrap();
            let pairs = pairs_of(&session);

            flip_pair(&session, [pairs[0][0], pairs[1][0]]).await;
            sleep(DELAY + FLIP + TICK).await;
            play_to_completion(&session).await;

            assert_eq!(audio.flips.get(), 6);
            assert_eq!(audio.mismatches.get(), 1);
            assert_eq!(audio.matches.get(), 2);
            assert_eq!(audio.completions.get(), 1);
        })
        .await;
}
