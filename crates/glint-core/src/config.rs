#![forbid(unsafe_code)]

//! Effect options, validation, and the typed per-stage configuration.
//!
//! Hosts fill in a [`FlashOptions`] (every field has a default) and hand it
//! to [`FlashManager::init`]. Validation is a single synchronous pass that
//! either rejects the options with a [`ConfigError`] naming the offending
//! field, or admits them for conversion into the typed [`FlashConfig`] each
//! stage keeps its own copy of. Nothing animates before validation passes.
//!
//! [`FlashManager::init`]: crate::controller::FlashManager::init
//!
//! # Failure Modes
//!
//! - Negative or non-finite durations: rejected per field.
//! - `repeat` of 0 (or below -1): rejected; -1 means unlimited.
//! - Empty explicit string list: rejected.
//! - No strings and no stage children to derive them from: rejected at init.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::rng::Rng;
use crate::selection::Selection;

/// Upper bound for randomized inter-cycle pauses.
pub const RANDOM_PAUSE_MAX: Duration = Duration::from_millis(3000);

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

/// Raw inter-cycle pause setting as supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseSetting {
    /// Fixed delay in milliseconds.
    Millis(f64),
    /// Fresh uniform delay in `[0, RANDOM_PAUSE_MAX)` before every cycle.
    Random,
}

impl Default for PauseSetting {
    fn default() -> Self {
        Self::Millis(0.0)
    }
}

impl FromStr for PauseSetting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "random" {
            return Ok(Self::Random);
        }
        s.parse::<f64>()
            .map(Self::Millis)
            .map_err(|_| ConfigError::InvalidPause(s.to_string()))
    }
}

/// Host-facing effect options.
///
/// Every field has a default, so hosts set only what they care about:
///
/// ```ignore
/// let options = FlashOptions::default()
///     .strings(vec!["one".into(), "two".into()])
///     .selection(Selection::Ascending)
///     .repeat(5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlashOptions {
    /// Strings to flash. `None` derives each stage's set from its children.
    pub strings: Option<Vec<String>>,
    /// Whether stages start animating at init.
    pub enabled: bool,
    /// Fade-in length in milliseconds.
    pub fade_in_ms: f64,
    /// Fully-visible hold length in milliseconds.
    pub hold_ms: f64,
    /// Fade-out length in milliseconds.
    pub fade_out_ms: f64,
    /// How the next string is chosen.
    pub selection: Selection,
    /// Number of cycles to play; -1 means unlimited.
    pub repeat: i64,
    /// Delay between cycles.
    pub pause: PauseSetting,
    /// Smallest font size a fragment may get.
    pub font_min: f32,
    /// Largest font size a fragment may get.
    pub font_max: f32,
    /// Unit label attached to sampled sizes ("px", "em", ...). Passed
    /// through to the host, never interpreted.
    pub font_unit: String,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self {
            strings: None,
            enabled: true,
            fade_in_ms: 300.0,
            hold_ms: 500.0,
            fade_out_ms: 300.0,
            selection: Selection::Random,
            repeat: -1,
            pause: PauseSetting::Millis(0.0),
            font_min: 7.0,
            font_max: 28.0,
            font_unit: "px".to_string(),
        }
    }
}

impl FlashOptions {
    /// Set the strings to flash (builder).
    #[must_use]
    pub fn strings(mut self, strings: Vec<String>) -> Self {
        self.strings = Some(strings);
        self
    }

    /// Set whether stages start animating at init (builder).
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the three cycle phase lengths in milliseconds (builder).
    #[must_use]
    pub fn timing(mut self, fade_in_ms: f64, hold_ms: f64, fade_out_ms: f64) -> Self {
        self.fade_in_ms = fade_in_ms;
        self.hold_ms = hold_ms;
        self.fade_out_ms = fade_out_ms;
        self
    }

    /// Set the selection policy (builder).
    #[must_use]
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Set the repeat count; -1 means unlimited (builder).
    #[must_use]
    pub fn repeat(mut self, repeat: i64) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the inter-cycle pause (builder).
    #[must_use]
    pub fn pause(mut self, pause: PauseSetting) -> Self {
        self.pause = pause;
        self
    }

    /// Set the font size range (builder).
    #[must_use]
    pub fn font_range(mut self, min: f32, max: f32) -> Self {
        self.font_min = min;
        self.font_max = max;
        self
    }

    /// Check every field, reporting the first offending one.
    ///
    /// Pure pass/fail: no side effects, nothing is normalized. Called once
    /// at init before any animation state exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fade_in_ms.is_finite() || self.fade_in_ms < 0.0 {
            return Err(ConfigError::NegativeFadeIn);
        }
        if !self.hold_ms.is_finite() || self.hold_ms < 0.0 {
            return Err(ConfigError::NegativeHold);
        }
        if !self.fade_out_ms.is_finite() || self.fade_out_ms < 0.0 {
            return Err(ConfigError::NegativeFadeOut);
        }
        if self.repeat != -1 && self.repeat <= 0 {
            return Err(ConfigError::InvalidRepeat(self.repeat));
        }
        if let PauseSetting::Millis(ms) = self.pause
            && (!ms.is_finite() || ms < 0.0)
        {
            return Err(ConfigError::NegativePause);
        }
        if !self.font_min.is_finite() || self.font_min <= 0.0 {
            return Err(ConfigError::FontMinNotPositive);
        }
        if !self.font_max.is_finite() || self.font_max <= 0.0 {
            return Err(ConfigError::FontMaxNotPositive);
        }
        if self.font_min > self.font_max {
            return Err(ConfigError::FontRangeInverted);
        }
        if let Some(strings) = &self.strings
            && strings.is_empty()
        {
            return Err(ConfigError::EmptyStrings);
        }
        Ok(())
    }

    /// Convert validated options into a stage's own config.
    ///
    /// `strings` is the stage's resolved set (explicit list or derived from
    /// its children); callers validate first.
    pub(crate) fn to_config(&self, strings: Vec<String>) -> FlashConfig {
        debug_assert!(self.validate().is_ok());
        debug_assert!(!strings.is_empty());
        FlashConfig {
            strings,
            enabled: self.enabled,
            fade_in: duration_ms(self.fade_in_ms),
            hold: duration_ms(self.hold_ms),
            fade_out: duration_ms(self.fade_out_ms),
            selection: self.selection,
            repeat: if self.repeat == -1 {
                Repeat::Unlimited
            } else {
                Repeat::Times(self.repeat.min(i64::from(u32::MAX)) as u32)
            },
            pause: match self.pause {
                PauseSetting::Millis(ms) => Pause::Fixed(duration_ms(ms)),
                PauseSetting::Random => Pause::Random,
            },
            font: FontRange {
                min: self.font_min,
                max: self.font_max,
                unit: self.font_unit.clone(),
            },
        }
    }
}

fn duration_ms(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

/// How many cycles remain to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play until disabled or destroyed.
    Unlimited,
    /// Play this many more cycles, then tear down.
    Times(u32),
}

impl Repeat {
    /// Whether no cycles remain.
    #[must_use]
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Times(0))
    }

    /// Consume one cycle. Unlimited never decrements.
    pub(crate) fn decrement(&mut self) {
        if let Self::Times(n) = self
            && *n > 0
        {
            *n -= 1;
        }
    }
}

/// Validated inter-cycle pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Fixed delay before every cycle.
    Fixed(Duration),
    /// Fresh uniform delay in `[0, RANDOM_PAUSE_MAX)` before every cycle.
    Random,
}

impl Pause {
    /// The delay to wait before the next cycle.
    pub fn delay(self, rng: &mut Rng) -> Duration {
        match self {
            Self::Fixed(d) => d,
            Self::Random => {
                let ms = rng.range_f32(0.0, RANDOM_PAUSE_MAX.as_millis() as f32);
                Duration::from_secs_f64(f64::from(ms) / 1000.0)
            }
        }
    }
}

/// Validated font size range.
#[derive(Debug, Clone, PartialEq)]
pub struct FontRange {
    /// Smallest size a fragment may get.
    pub min: f32,
    /// Largest size a fragment may get.
    pub max: f32,
    /// Unit label passed through to the host.
    pub unit: String,
}

impl FontRange {
    /// Sample a size uniformly from `[min, max)`.
    ///
    /// When `min == max` every sample is exactly `min`.
    pub fn sample(&self, rng: &mut Rng) -> f32 {
        rng.range_f32(self.min, self.max)
    }
}

/// A stage's own validated configuration.
///
/// Built once at init and never mutated; runtime state (remaining repeats,
/// last index, enabled flag) lives in the stage's flasher instead.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashConfig {
    /// Strings to flash, resolved per stage. Never empty.
    pub strings: Vec<String>,
    /// Whether the stage starts animating at init.
    pub enabled: bool,
    /// Fade-in length.
    pub fade_in: Duration,
    /// Fully-visible hold length.
    pub hold: Duration,
    /// Fade-out length.
    pub fade_out: Duration,
    /// How the next string is chosen.
    pub selection: Selection,
    /// Cycles to play.
    pub repeat: Repeat,
    /// Delay between cycles.
    pub pause: Pause,
    /// Font size range fragments sample from.
    pub font: FontRange,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a set of options was rejected.
///
/// Each variant names the offending field; the rejection happens before any
/// animation side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `fade_in_ms` was negative or not finite.
    NegativeFadeIn,
    /// `hold_ms` was negative or not finite.
    NegativeHold,
    /// `fade_out_ms` was negative or not finite.
    NegativeFadeOut,
    /// `repeat` was 0 or below -1.
    InvalidRepeat(i64),
    /// A fixed pause was negative or not finite.
    NegativePause,
    /// A pause string was neither a number nor `"random"`.
    InvalidPause(String),
    /// `font_min` was zero, negative, or not finite.
    FontMinNotPositive,
    /// `font_max` was zero, negative, or not finite.
    FontMaxNotPositive,
    /// `font_min` exceeded `font_max`.
    FontRangeInverted,
    /// An explicit string list was empty.
    EmptyStrings,
    /// No strings were given and a stage has no children to derive them from.
    MissingStrings,
    /// A selection string named no known policy.
    InvalidSelection(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeFadeIn => write!(f, "fade_in_ms must be a non-negative number"),
            Self::NegativeHold => write!(f, "hold_ms must be a non-negative number"),
            Self::NegativeFadeOut => write!(f, "fade_out_ms must be a non-negative number"),
            Self::InvalidRepeat(n) => {
                write!(f, "repeat must be -1 or a positive number of cycles (got {n})")
            }
            Self::NegativePause => write!(f, "pause must be a non-negative number of milliseconds"),
            Self::InvalidPause(s) => {
                write!(f, "pause must be a number of milliseconds or \"random\" (got {s:?})")
            }
            Self::FontMinNotPositive => write!(f, "font_min must be a positive number"),
            Self::FontMaxNotPositive => write!(f, "font_max must be a positive number"),
            Self::FontRangeInverted => write!(f, "font_min must not exceed font_max"),
            Self::EmptyStrings => write!(f, "strings must contain at least one entry"),
            Self::MissingStrings => {
                write!(f, "no strings given and a stage has no children to derive them from")
            }
            Self::InvalidSelection(s) => write!(
                f,
                "selection must be \"random\", \"ascending\" or \"descending\" (got {s:?})"
            ),
        }
    }
}

impl Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = FlashOptions::default();
        assert_eq!(opts.strings, None);
        assert!(opts.enabled);
        assert_eq!(opts.fade_in_ms, 300.0);
        assert_eq!(opts.hold_ms, 500.0);
        assert_eq!(opts.fade_out_ms, 300.0);
        assert_eq!(opts.selection, Selection::Random);
        assert_eq!(opts.repeat, -1);
        assert_eq!(opts.pause, PauseSetting::Millis(0.0));
        assert_eq!(opts.font_min, 7.0);
        assert_eq!(opts.font_max, 28.0);
        assert_eq!(opts.font_unit, "px");
    }

    #[test]
    fn defaults_validate() {
        assert!(FlashOptions::default().validate().is_ok());
    }

    #[test]
    fn negative_fade_in_rejected() {
        let opts = FlashOptions {
            fade_in_ms: -1.0,
            ..FlashOptions::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::NegativeFadeIn));
    }

    #[test]
    fn nan_hold_rejected() {
        let opts = FlashOptions {
            hold_ms: f64::NAN,
            ..FlashOptions::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::NegativeHold));
    }

    #[test]
    fn negative_fade_out_rejected() {
        let opts = FlashOptions {
            fade_out_ms: -0.5,
            ..FlashOptions::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::NegativeFadeOut));
    }

    #[test]
    fn repeat_zero_rejected() {
        let opts = FlashOptions::default().repeat(0);
        assert_eq!(opts.validate(), Err(ConfigError::InvalidRepeat(0)));
    }

    #[test]
    fn repeat_below_minus_one_rejected() {
        let opts = FlashOptions::default().repeat(-3);
        assert_eq!(opts.validate(), Err(ConfigError::InvalidRepeat(-3)));
    }

    #[test]
    fn repeat_minus_one_and_positive_accepted() {
        assert!(FlashOptions::default().repeat(-1).validate().is_ok());
        assert!(FlashOptions::default().repeat(12).validate().is_ok());
    }

    #[test]
    fn negative_pause_rejected() {
        let opts = FlashOptions::default().pause(PauseSetting::Millis(-10.0));
        assert_eq!(opts.validate(), Err(ConfigError::NegativePause));
    }

    #[test]
    fn random_pause_accepted() {
        assert!(FlashOptions::default().pause(PauseSetting::Random).validate().is_ok());
    }

    #[test]
    fn zero_font_min_rejected() {
        let opts = FlashOptions::default().font_range(0.0, 28.0);
        assert_eq!(opts.validate(), Err(ConfigError::FontMinNotPositive));
    }

    #[test]
    fn negative_font_max_rejected() {
        let opts = FlashOptions::default().font_range(7.0, -2.0);
        assert_eq!(opts.validate(), Err(ConfigError::FontMaxNotPositive));
    }

    #[test]
    fn inverted_font_range_rejected() {
        let opts = FlashOptions::default().font_range(28.0, 7.0);
        assert_eq!(opts.validate(), Err(ConfigError::FontRangeInverted));
    }

    #[test]
    fn equal_font_bounds_accepted() {
        assert!(FlashOptions::default().font_range(12.0, 12.0).validate().is_ok());
    }

    #[test]
    fn empty_explicit_strings_rejected() {
        let opts = FlashOptions::default().strings(Vec::new());
        assert_eq!(opts.validate(), Err(ConfigError::EmptyStrings));
    }

    #[test]
    fn absent_strings_pass_field_validation() {
        // Derivation from children happens at init; absence alone is fine.
        assert!(FlashOptions { strings: None, ..FlashOptions::default() }.validate().is_ok());
    }

    #[test]
    fn conversion_maps_durations_and_repeat() {
        let opts = FlashOptions::default()
            .strings(vec!["a".into()])
            .timing(100.0, 250.0, 50.0)
            .repeat(4);
        let config = opts.to_config(vec!["a".into()]);
        assert_eq!(config.fade_in, Duration::from_millis(100));
        assert_eq!(config.hold, Duration::from_millis(250));
        assert_eq!(config.fade_out, Duration::from_millis(50));
        assert_eq!(config.repeat, Repeat::Times(4));
    }

    #[test]
    fn conversion_maps_unlimited_and_pause() {
        let opts = FlashOptions::default().pause(PauseSetting::Millis(750.0));
        let config = opts.to_config(vec!["a".into()]);
        assert_eq!(config.repeat, Repeat::Unlimited);
        assert_eq!(config.pause, Pause::Fixed(Duration::from_millis(750)));

        let opts = FlashOptions::default().pause(PauseSetting::Random);
        let config = opts.to_config(vec!["a".into()]);
        assert_eq!(config.pause, Pause::Random);
    }

    #[test]
    fn pause_setting_parses() {
        assert_eq!("random".parse::<PauseSetting>().unwrap(), PauseSetting::Random);
        assert_eq!("250".parse::<PauseSetting>().unwrap(), PauseSetting::Millis(250.0));
        assert!(matches!(
            "sometimes".parse::<PauseSetting>(),
            Err(ConfigError::InvalidPause(ref s)) if s == "sometimes"
        ));
    }

    #[test]
    fn random_pause_delay_is_bounded() {
        let mut rng = Rng::new(3);
        for _ in 0..1000 {
            let d = Pause::Random.delay(&mut rng);
            assert!(d < RANDOM_PAUSE_MAX, "pause too long: {d:?}");
        }
    }

    #[test]
    fn fixed_pause_delay_is_exact() {
        let mut rng = Rng::new(3);
        let d = Pause::Fixed(Duration::from_millis(42)).delay(&mut rng);
        assert_eq!(d, Duration::from_millis(42));
    }

    #[test]
    fn font_sample_in_range() {
        let mut rng = Rng::new(8);
        let font = FontRange { min: 7.0, max: 28.0, unit: "px".into() };
        for _ in 0..1000 {
            let size = font.sample(&mut rng);
            assert!((7.0..28.0).contains(&size), "size out of range: {size}");
        }
    }

    #[test]
    fn font_sample_degenerate_range() {
        let mut rng = Rng::new(8);
        let font = FontRange { min: 12.0, max: 12.0, unit: "px".into() };
        assert_eq!(font.sample(&mut rng), 12.0);
    }

    #[test]
    fn repeat_decrement_and_exhaustion() {
        let mut r = Repeat::Times(2);
        assert!(!r.is_exhausted());
        r.decrement();
        r.decrement();
        assert!(r.is_exhausted());
        r.decrement();
        assert_eq!(r, Repeat::Times(0));

        let mut u = Repeat::Unlimited;
        u.decrement();
        assert_eq!(u, Repeat::Unlimited);
        assert!(!u.is_exhausted());
    }

    #[test]
    fn errors_name_the_offending_field() {
        assert!(ConfigError::NegativeFadeIn.to_string().contains("fade_in_ms"));
        assert!(ConfigError::NegativeHold.to_string().contains("hold_ms"));
        assert!(ConfigError::InvalidRepeat(0).to_string().contains("repeat"));
        assert!(ConfigError::FontRangeInverted.to_string().contains("font_min"));
        assert!(ConfigError::EmptyStrings.to_string().contains("strings"));
        assert!(
            ConfigError::InvalidSelection("x".into())
                .to_string()
                .contains("selection")
        );
    }
}
