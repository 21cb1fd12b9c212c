#![forbid(unsafe_code)]

//! Opacity envelope for one flash cycle.
//!
//! [`FlashEnvelope`] walks fade-in → hold → fade-out and reports an opacity
//! in `[0.0, 1.0]` at every tick. Time is accumulated as [`Duration`] for
//! precise boundaries and overshoot accounting; there is no wall clock
//! inside, so tests can drive the envelope synchronously.
//!
//! # Invariants
//!
//! 1. Opacity is 1.0 for the whole hold phase and 0.0 once complete.
//! 2. A zero-length phase contributes full progress immediately and is
//!    skipped by the next tick, however small.
//! 3. A tick that crosses a phase boundary carries the remainder into the
//!    following phase; time is never dropped at a boundary.
//! 4. [`FlashEnvelope::finish`] jumps straight to completion. It is the
//!    cancellation path; no further ticks are required.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the envelope currently is within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopePhase {
    /// Opacity rising from 0.0 to 1.0.
    #[default]
    FadeIn,
    /// Fully visible.
    Hold,
    /// Opacity falling from 1.0 to 0.0.
    FadeOut,
    /// Cycle complete; opacity is 0.0.
    Done,
}

// ---------------------------------------------------------------------------
// FlashEnvelope
// ---------------------------------------------------------------------------

/// Fade-in → hold → fade-out opacity curve with configurable easing.
#[derive(Debug, Clone, Copy)]
pub struct FlashEnvelope {
    fade_in: Duration,
    hold: Duration,
    fade_out: Duration,
    easing: EasingFn,
    phase: EnvelopePhase,
    /// Elapsed time within the current phase.
    elapsed: Duration,
    /// Time accumulated past completion.
    overshoot: Duration,
}

impl FlashEnvelope {
    /// Create an envelope with the given phase lengths and linear easing.
    ///
    /// Zero lengths are legal; the corresponding phase is skipped.
    #[must_use]
    pub fn new(fade_in: Duration, hold: Duration, fade_out: Duration) -> Self {
        Self {
            fade_in,
            hold,
            fade_out,
            easing: linear,
            phase: EnvelopePhase::FadeIn,
            elapsed: Duration::ZERO,
            overshoot: Duration::ZERO,
        }
    }

    /// Set the easing function applied to both fades (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    fn phase_len(&self, phase: EnvelopePhase) -> Duration {
        match phase {
            EnvelopePhase::FadeIn => self.fade_in,
            EnvelopePhase::Hold => self.hold,
            EnvelopePhase::FadeOut => self.fade_out,
            EnvelopePhase::Done => Duration::ZERO,
        }
    }

    /// Linear progress through the current phase, in [0.0, 1.0].
    ///
    /// A zero-length phase reads as fully progressed.
    pub fn progress(&self) -> f32 {
        let total = self.phase_len(self.phase);
        if total.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / total.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Advance by `dt`, crossing as many phase boundaries as `dt` covers.
    ///
    /// Returns `true` when the phase changed during this tick.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let start = self.phase;
        let mut remaining = dt;
        loop {
            if self.phase == EnvelopePhase::Done {
                self.overshoot = self.overshoot.saturating_add(remaining);
                break;
            }
            let left = self.phase_len(self.phase).saturating_sub(self.elapsed);
            if remaining < left {
                self.elapsed = self.elapsed.saturating_add(remaining);
                break;
            }
            remaining -= left;
            self.phase = match self.phase {
                EnvelopePhase::FadeIn => EnvelopePhase::Hold,
                EnvelopePhase::Hold => EnvelopePhase::FadeOut,
                EnvelopePhase::FadeOut | EnvelopePhase::Done => EnvelopePhase::Done,
            };
            self.elapsed = Duration::ZERO;
        }
        self.phase != start
    }

    /// Current opacity in [0.0, 1.0].
    pub fn opacity(&self) -> f32 {
        match self.phase {
            EnvelopePhase::FadeIn => (self.easing)(self.progress()),
            EnvelopePhase::Hold => 1.0,
            EnvelopePhase::FadeOut => 1.0 - (self.easing)(self.progress()),
            EnvelopePhase::Done => 0.0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Whether the cycle has finished.
    pub fn is_complete(&self) -> bool {
        self.phase == EnvelopePhase::Done
    }

    /// Time accumulated past completion, to be forwarded by the caller.
    pub fn overshoot(&self) -> Duration {
        self.overshoot
    }

    /// Jump to completion. Overshoot stays as accumulated so far.
    pub fn finish(&mut self) {
        self.phase = EnvelopePhase::Done;
        self.elapsed = Duration::ZERO;
    }

    /// Return to the start of the fade-in.
    pub fn reset(&mut self) {
        self.phase = EnvelopePhase::FadeIn;
        self.elapsed = Duration::ZERO;
        self.overshoot = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
