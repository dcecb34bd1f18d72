//! Game configuration types.
//!
//! - `LayoutBounds`: limits for randomly picked grids
//! - `GameConfig`: timings, the optional reveal cap, and level count
//!
//! Timings are stored as seconds (`f64`) so a config file reads naturally;
//! the `flip_time()`-style accessors hand out `Duration`s for the scheduler.
//!
//! ```
//! use pairflip::core::GameConfig;
//!
//! let config = GameConfig::from_toml_str(r#"
//!     mismatch_reveal_delay = 0.8
//!     max_concurrent_reveals = 2
//! "#).unwrap();
//!
//! assert_eq!(config.mismatch_reveal_delay, 0.8);
//! assert_eq!(config.combo_window, 2.0); // untouched fields keep defaults
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Bounds for [`pick_random_layout`](crate::grid::pick_random_layout).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutBounds {
    pub min_rows: usize,
    pub max_rows: usize,
    pub min_cols: usize,
    pub max_cols: usize,
    /// Upper limit on `rows * cols`.
    pub max_cells: usize,
}

impl Default for LayoutBounds {
    fn default() -> Self {
        Self {
            min_rows: 2,
            max_rows: 5,
            min_cols: 2,
            max_cols: 6,
            max_cells: 30,
        }
    }
}

impl LayoutBounds {
    /// Check that the bounds describe at least one grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rows == 0 || self.min_cols == 0 {
            return Err(ConfigError::InvalidBounds("minimum rows and cols must be positive".into()));
        }
        if self.min_rows > self.max_rows || self.min_cols > self.max_cols {
            return Err(ConfigError::InvalidBounds(format!(
                "rows {}..={} cols {}..={}",
                self.min_rows, self.max_rows, self.min_cols, self.max_cols
            )));
        }
        if self.max_cells < self.min_rows * self.min_cols {
            return Err(ConfigError::InvalidBounds(format!(
                "max_cells {} is smaller than the minimum grid {}x{}",
                self.max_cells, self.min_rows, self.min_cols
            )));
        }
        Ok(())
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of one flip animation, in seconds.
    pub flip_duration: f64,

    /// How long a mismatched pair stays face-up before hiding, in seconds.
    pub mismatch_reveal_delay: f64,

    /// Maximum gap between consecutive matches that still counts as a combo.
    pub combo_window: f64,

    /// How long every card is shown at level start.
    pub preview_duration: f64,

    /// Pause after the preview hides cards, before play starts.
    pub preview_settle: f64,

    /// Optional input cap on cards that are face-up but unresolved.
    ///
    /// `None` lets reveals pile up without limit; the resolver pairs them
    /// in arrival order either way.
    pub max_concurrent_reveals: Option<usize>,

    /// Bounds used for random layouts.
    pub layout: LayoutBounds,

    /// Number of levels in the progression.
    pub level_count: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            flip_duration: 0.18,
            mismatch_reveal_delay: 0.6,
            combo_window: 2.0,
            preview_duration: 2.0,
            preview_settle: 0.25,
            max_concurrent_reveals: None,
            layout: LayoutBounds::default(),
            level_count: 10,
        }
    }
}

impl GameConfig {
    /// Create a configuration with the default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the flip animation length in seconds.
    #[must_use]
    pub fn with_flip_duration(mut self, seconds: f64) -> Self {
        self.flip_duration = seconds;
        self
    }

    /// Set the mismatch hide delay in seconds.
    #[must_use]
    pub fn with_mismatch_reveal_delay(mut self, seconds: f64) -> Self {
        self.mismatch_reveal_delay = seconds;
        self
    }

    /// Set the combo window in seconds.
    #[must_use]
    pub fn with_combo_window(mut self, seconds: f64) -> Self {
        self.combo_window = seconds;
        self
    }

    /// Set the preview timings in seconds.
    #[must_use]
    pub fn with_preview(mut self, duration: f64, settle: f64) -> Self {
        self.preview_duration = duration;
        self.preview_settle = settle;
        self
    }

    /// Cap the number of unresolved face-up cards accepted from input.
    #[must_use]
    pub fn with_max_concurrent_reveals(mut self, cap: usize) -> Self {
        self.max_concurrent_reveals = Some(cap);
        self
    }

    /// Set the random layout bounds.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutBounds) -> Self {
        self.layout = layout;
        self
    }

    /// Set the number of levels.
    #[must_use]
    pub fn with_level_count(mut self, count: u32) -> Self {
        self.level_count = count;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("flip_duration", self.flip_duration),
            ("mismatch_reveal_delay", self.mismatch_reveal_delay),
            ("combo_window", self.combo_window),
            ("preview_duration", self.preview_duration),
            ("preview_settle", self.preview_settle),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        if let Some(cap) = self.max_concurrent_reveals {
            if cap < 2 {
                return Err(ConfigError::RevealCapTooSmall(cap));
            }
        }
        if self.level_count == 0 {
            return Err(ConfigError::NoLevels);
        }
        self.layout.validate()
    }

    /// Flip animation length.
    #[must_use]
    pub fn flip_time(&self) -> Duration {
        seconds(self.flip_duration)
    }

    /// Mismatch hide delay.
    #[must_use]
    pub fn mismatch_delay(&self) -> Duration {
        seconds(self.mismatch_reveal_delay)
    }

    /// Preview display time.
    #[must_use]
    pub fn preview_time(&self) -> Duration {
        seconds(self.preview_duration)
    }

    /// Pause after the preview.
    #[must_use]
    pub fn preview_settle_time(&self) -> Duration {
        seconds(self.preview_settle)
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.flip_time(), Duration::from_secs_f64(0.18));
        assert_eq!(config.mismatch_delay(), Duration::from_millis(600));
        assert_eq!(config.combo_window, 2.0);
        assert_eq!(config.max_concurrent_reveals, None);
        assert_eq!(config.level_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::new()
            .with_flip_duration(0.1)
            .with_mismatch_reveal_delay(1.0)
            .with_combo_window(3.0)
            .with_preview(1.0, 0.5)
            .with_max_concurrent_reveals(2)
            .with_level_count(4);

        assert_eq!(config.flip_time(), Duration::from_millis(100));
        assert_eq!(config.mismatch_delay(), Duration::from_secs(1));
        assert_eq!(config.preview_time(), Duration::from_secs(1));
        assert_eq!(config.preview_settle_time(), Duration::from_millis(500));
        assert_eq!(config.max_concurrent_reveals, Some(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let config = GameConfig::new().with_mismatch_reveal_delay(-0.1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "mismatch_reveal_delay", value: -0.1 })
        );
        // The accessor never panics on bad input.
        assert_eq!(config.mismatch_delay(), Duration::ZERO);
    }

    #[test]
    fn test_reveal_cap_too_small() {
        let config = GameConfig::new().with_max_concurrent_reveals(1);
        assert_eq!(config.validate(), Err(ConfigError::RevealCapTooSmall(1)));
    }

    #[test]
    fn test_layout_bounds_validation() {
        let inverted = LayoutBounds { min_rows: 4, max_rows: 2, ..LayoutBounds::default() };
        assert!(matches!(inverted.validate(), Err(ConfigError::InvalidBounds(_))));

        let cramped = LayoutBounds { max_cells: 3, ..LayoutBounds::default() };
        assert!(matches!(cramped.validate(), Err(ConfigError::InvalidBounds(_))));
    }

    #[test]
    fn test_from_toml() {
        let config = GameConfig::from_toml_str(
            r#"
            flip_duration = 0.25
            level_count = 3

            [layout]
            max_cols = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.flip_duration, 0.25);
        assert_eq!(config.level_count, 3);
        assert_eq!(config.layout.max_cols, 4);
        assert_eq!(config.layout.max_rows, 5);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(matches!(
            GameConfig::from_toml_str("level_count = 0"),
            Err(ConfigError::NoLevels)
        ));
        assert!(matches!(
            GameConfig::from_toml_str("flip_duration = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
