//! Audio collaborator interface.

/// Sound cues the session triggers. Every method defaults to silence, so
/// implementors override only what they play.
pub trait AudioCues {
    /// A card finished flipping face up during play.
    fn flip(&self) {}

    /// A pair matched.
    fn matched(&self) {}

    /// A pair mismatched.
    fn mismatched(&self) {}

    /// The level was completed. Fires once per level.
    fn level_complete(&self) {}
}

/// Plays nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioCues for Silent {}
