//! Plays one memory game with a simulated player and logs the event stream.
//!
//! ```text
//! RUST_LOG=pairflip=debug autoplay --level 6 --seed 7 --speed 20
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pairflip::{CardId, CardState, GameConfig, GameRng, LevelId, PairId, SessionContext, SessionController};
use rustc_hash::FxHashMap;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for autoplay
#[derive(Parser, Debug)]
#[command(name = "autoplay")]
#[command(about = "Play a memory level with a simulated player")]
#[command(version)]
struct Args {
    /// Level to play
    #[arg(short, long, default_value = "1")]
    level: u32,

    /// Deal a random layout instead of a level
    #[arg(long)]
    random_layout: bool,

    /// Seed for the player (and the random layout)
    #[arg(long, env = "PAIRFLIP_SEED")]
    seed: Option<u64>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Divide every configured duration by this factor
    #[arg(long, default_value = "10.0")]
    speed: f64,

    /// Show the preview before playing
    #[arg(long)]
    preview: bool,

    /// Give up after this many turns
    #[arg(long, default_value = "500")]
    max_turns: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoplay=info,pairflip=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    tokio::task::LocalSet::new().run_until(play(args, config)).await
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let config = match &args.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            GameConfig::from_toml_str(&source).context("Invalid config")?
        }
        None => GameConfig::new(),
    };

    let speed = if args.speed > 0.0 { args.speed } else { 1.0 };
    Ok(GameConfig {
        flip_duration: config.flip_duration / speed,
        mismatch_reveal_delay: config.mismatch_reveal_delay / speed,
        combo_window: config.combo_window / speed,
        preview_duration: config.preview_duration / speed,
        preview_settle: config.preview_settle / speed,
        ..config
    })
}

async fn play(args: Args, config: GameConfig) -> Result<()> {
    let session = SessionController::new(config.clone(), SessionContext::new(config.level_count))
        .context("Failed to create session")?;
    let _log = session.subscribe(|event| info!(?event, "session event"));

    let root = args.seed.map(GameRng::new).unwrap_or_else(GameRng::from_entropy);
    info!(seed = root.seed(), "seeded");
    let mut rng = root.for_context("player");

    let layout = if args.random_layout {
        session.start_random_game(&mut root.for_context("layout"))?
    } else {
        session.start_level(LevelId::new(args.level))?
    };
    info!(%layout, "dealt");

    if args.preview {
        session.run_preview().await;
    }

    let flip = config.flip_time() + Duration::from_millis(1);
    let settle = config.flip_time() * 2 + config.mismatch_delay() + Duration::from_millis(1);
    let mut player = Player::default();

    for turn in 1..=args.max_turns {
        if session.is_complete() {
            info!(turn, score = session.score(), "finished");
            return Ok(());
        }

        let Some(first) = player.pick_first(&session, &mut rng) else {
            break;
        };
        session.flip(first);
        tokio::time::sleep(flip).await;
        player.learn(&session, first);

        let Some(second) = player.pick_second(&session, first, &mut rng) else {
            break;
        };
        session.flip(second);
        tokio::time::sleep(flip).await;
        player.learn(&session, second);

        tokio::time::sleep(settle).await;
    }

    warn!(matched = session.matched_pairs(), total = session.total_pairs(), "gave up");
    Ok(())
}

/// Remembers every card it has seen face up.
#[derive(Default)]
struct Player {
    seen: FxHashMap<CardId, PairId>,
}

impl Player {
    fn learn(&mut self, session: &SessionController, card: CardId) {
        if let Some(pair_id) = session.board().pair_id(card) {
            self.seen.insert(card, pair_id);
        }
    }

    fn hidden(session: &SessionController) -> Vec<CardId> {
        session
            .cards()
            .into_iter()
            .filter(|c| session.board().state(*c) == Some(CardState::Hidden))
            .collect()
    }

    /// A remembered card whose partner is also remembered, else an unseen card.
    fn pick_first(&self, session: &SessionController, rng: &mut GameRng) -> Option<CardId> {
        let hidden = Self::hidden(session);
        let known_pair = hidden.iter().copied().find(|card| {
            self.partner_of(*card, &hidden).is_some()
        });
        if known_pair.is_some() {
            return known_pair;
        }

        let unseen: Vec<CardId> = hidden.iter().copied().filter(|c| !self.seen.contains_key(c)).collect();
        rng.choose(&unseen).or_else(|| rng.choose(&hidden)).copied()
    }

    fn pick_second(&self, session: &SessionController, first: CardId, rng: &mut GameRng) -> Option<CardId> {
        let hidden: Vec<CardId> = Self::hidden(session).into_iter().filter(|c| *c != first).collect();
        if let Some(partner) = self.partner_of(first, &hidden) {
            return Some(partner);
        }

        let unseen: Vec<CardId> = hidden.iter().copied().filter(|c| !self.seen.contains_key(c)).collect();
        rng.choose(&unseen).or_else(|| rng.choose(&hidden)).copied()
    }

    fn partner_of(&self, card: CardId, candidates: &[CardId]) -> Option<CardId> {
        let pair_id = self.seen.get(&card)?;
        candidates
            .iter()
            .copied()
            .find(|other| *other != card && self.seen.get(other) == Some(pair_id))
    }
}
