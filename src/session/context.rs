//! Level selection and unlock progress.

use serde::{Deserialize, Serialize};

use crate::core::LevelId;

/// Which level is selected and how far the player has unlocked.
///
/// Passed to the controller at construction; the controller advances it
/// when a level is completed. Persisting it is up to the caller.
///
/// ```
/// use pairflip::core::LevelId;
/// use pairflip::session::SessionContext;
///
/// let mut ctx = SessionContext::new(3);
/// assert!(!ctx.select(LevelId::new(2)));
///
/// assert_eq!(ctx.unlock_after(LevelId::new(1)), Some(LevelId::new(2)));
/// assert!(ctx.select(LevelId::new(2)));
///
/// ctx.unlock_after(LevelId::new(2));
/// assert_eq!(ctx.unlock_after(LevelId::new(3)), None); // no level 4
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    selected: LevelId,
    unlocked: LevelId,
    level_count: u32,
}

impl SessionContext {
    /// Fresh progress: only level 1 unlocked and selected.
    #[must_use]
    pub fn new(level_count: u32) -> Self {
        Self {
            selected: LevelId::FIRST,
            unlocked: LevelId::FIRST,
            level_count: level_count.max(1),
        }
    }

    /// Restore saved progress, clamped to the level range.
    #[must_use]
    pub fn with_unlocked(level_count: u32, unlocked: LevelId) -> Self {
        let mut ctx = Self::new(level_count);
        ctx.unlocked = LevelId::new(unlocked.raw().clamp(1, ctx.level_count));
        ctx
    }

    /// The same progress over `level_count` levels. Unlocked and selected
    /// levels past the new end are pulled back to it.
    #[must_use]
    pub fn with_level_count(mut self, level_count: u32) -> Self {
        let count = level_count.max(1);
        self.level_count = count;
        self.unlocked = LevelId::new(self.unlocked.raw().clamp(1, count));
        self.selected = LevelId::new(self.selected.raw().clamp(1, count));
        self
    }

    #[must_use]
    pub fn selected(&self) -> LevelId {
        self.selected
    }

    /// Highest unlocked level.
    #[must_use]
    pub fn unlocked(&self) -> LevelId {
        self.unlocked
    }

    #[must_use]
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    #[must_use]
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        level.raw() >= 1 && level <= self.unlocked
    }

    /// Select an unlocked level. Returns false and keeps the old selection
    /// for locked ones.
    pub fn select(&mut self, level: LevelId) -> bool {
        if !self.is_unlocked(level) {
            return false;
        }
        self.selected = level;
        true
    }

    /// Record that `completed` was beaten. Returns the newly unlocked level,
    /// if any.
    pub fn unlock_after(&mut self, completed: LevelId) -> Option<LevelId> {
        let next = completed.next();
        if next > self.unlocked && next.raw() <= self.level_count {
            self.unlocked = next;
            Some(next)
        } else {
            None
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(10)
    }
}
