#![forbid(unsafe_code)]

//! Per-stage animation loop.
//!
//! A [`Flasher`] owns one stage's playback: its config copy, the index of
//! the last string shown, the remaining repeat budget, and the current
//! phase. Each cycle spawns a transient [`Fragment`], runs the opacity
//! envelope to completion, then waits out the inter-cycle pause and starts
//! the next cycle with the selection policy's next index.
//!
//! Everything advances inside [`Flasher::tick`]; there are no timers or
//! threads, so tests drive a flasher synchronously. Side effects surface as
//! [`FlashEvent`]s drained by the caller.
//!
//! # Invariants
//!
//! 1. The shown index is persisted before its fragment appears, so a later
//!    enable replays exactly the string that was on screen.
//! 2. Cycle bookkeeping (fragment drop, repeat decrement, next-index pick)
//!    runs exactly once per cycle, on completion or on forced completion.
//! 3. Time crossing a cycle boundary is forwarded into the next cycle.
//!    A single tick begins at most one new cycle; time past a second
//!    boundary is dropped, which bounds events per tick after a stall.
//! 4. A disabled flasher holds no fragment and schedules nothing.

use std::time::Duration;

use crate::config::{FlashConfig, Repeat};
use crate::envelope::{EnvelopePhase, FlashEnvelope};
use crate::fragment::{Fragment, Measure, Size};
use crate::rng::Rng;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Observable playback state of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashState {
    /// A fragment is fading in or holding.
    Showing,
    /// A fragment is fading out.
    Hiding,
    /// Between cycles; the pause timer is running.
    Waiting,
    /// Halted by disable; resumable.
    Disabled,
    /// Repeat budget exhausted; awaiting teardown.
    Finished,
}

/// A side effect of playback, drained by the caller after each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FlashEvent {
    /// A new fragment appeared.
    Shown(Fragment),
    /// The current fragment was removed.
    Hidden,
    /// The repeat budget ran out; the stage should be torn down.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Cycle { envelope: FlashEnvelope, index: usize },
    Waiting { remaining: Duration, next: usize },
    Halted,
    Exhausted,
}

// ---------------------------------------------------------------------------
// Flasher
// ---------------------------------------------------------------------------

/// One stage's animation loop.
#[derive(Debug)]
pub struct Flasher {
    config: FlashConfig,
    stage: Size,
    measure: Measure,
    rng: Rng,
    enabled: bool,
    last_index: Option<usize>,
    remaining: Repeat,
    fragment: Option<Fragment>,
    phase: Phase,
    events: Vec<FlashEvent>,
}

impl Flasher {
    /// Create a flasher for one stage.
    ///
    /// When the config is enabled, the first cycle starts immediately at
    /// the selection policy's initial index (its fragment is spawned with
    /// opacity 0, so nothing is visible until the first tick).
    #[must_use]
    pub fn new(config: FlashConfig, stage: Size, measure: Measure, rng: Rng) -> Self {
        let enabled = config.enabled;
        let remaining = config.repeat;
        let mut flasher = Self {
            config,
            stage,
            measure,
            rng,
            enabled,
            last_index: None,
            remaining,
            fragment: None,
            phase: Phase::Halted,
            events: Vec::new(),
        };
        if flasher.enabled {
            let first = flasher
                .config
                .selection
                .initial(flasher.config.strings.len(), &mut flasher.rng);
            flasher.begin_cycle(first);
        }
        flasher
    }

    /// Advance playback by `dt`.
    pub fn tick(&mut self, mut dt: Duration) {
        let mut began = false;
        loop {
            match &mut self.phase {
                Phase::Cycle { envelope, index } => {
                    envelope.tick(dt);
                    if !envelope.is_complete() {
                        return;
                    }
                    dt = envelope.overshoot();
                    let index = *index;
                    self.complete_cycle(index);
                    if !matches!(self.phase, Phase::Waiting { .. }) {
                        return;
                    }
                }
                Phase::Waiting { remaining, next } => {
                    if dt < *remaining {
                        *remaining -= dt;
                        return;
                    }
                    if began {
                        // Second boundary in one tick: hold at the start of
                        // the wait and drop the leftover time.
                        *remaining = Duration::ZERO;
                        return;
                    }
                    dt -= *remaining;
                    let next = *next;
                    self.begin_cycle(next);
                    began = true;
                }
                Phase::Halted | Phase::Exhausted => return,
            }
        }
    }

    /// Resume playback after a disable.
    ///
    /// Replays the last shown string; a stage that never ran starts at the
    /// selection policy's initial index. No-op while running. A stage
    /// resumed with its repeat budget already spent replays one final
    /// cycle, whose completion finishes the stage.
    pub fn enable(&mut self) {
        match self.phase {
            Phase::Cycle { .. } | Phase::Waiting { .. } | Phase::Exhausted => {}
            Phase::Halted => {
                self.enabled = true;
                let index = match self.last_index {
                    Some(i) => i,
                    None => self
                        .config
                        .selection
                        .initial(self.config.strings.len(), &mut self.rng),
                };
                #[cfg(feature = "tracing")]
                tracing::debug!(index, "playback resumed");
                self.begin_cycle(index);
            }
        }
    }

    /// Halt playback, force-completing any in-flight cycle.
    ///
    /// A mid-cycle disable runs the cycle's completion bookkeeping (the
    /// fragment is dropped and the repeat budget decremented) before
    /// halting; a disable during the pause halts without playing another
    /// cycle. No-op when already halted.
    pub fn disable(&mut self) {
        self.enabled = false;
        match self.phase {
            Phase::Cycle { index, .. } => {
                self.complete_cycle(index);
            }
            Phase::Waiting { .. } => {
                self.phase = Phase::Halted;
            }
            Phase::Halted | Phase::Exhausted => {}
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("playback halted");
    }

    fn begin_cycle(&mut self, index: usize) {
        self.last_index = Some(index);
        let text = self.config.strings[index].clone();
        let fragment =
            Fragment::spawn(text, self.stage, self.measure, &self.config.font, &mut self.rng);
        #[cfg(feature = "tracing")]
        tracing::debug!(index, text = %fragment.text, "cycle started");
        self.events.push(FlashEvent::Shown(fragment.clone()));
        self.fragment = Some(fragment);
        let envelope =
            FlashEnvelope::new(self.config.fade_in, self.config.hold, self.config.fade_out);
        self.phase = Phase::Cycle { envelope, index };
    }

    /// End-of-cycle bookkeeping. Runs exactly once per cycle.
    fn complete_cycle(&mut self, index: usize) {
        self.fragment = None;
        self.events.push(FlashEvent::Hidden);
        self.remaining.decrement();
        if !self.enabled {
            self.phase = Phase::Halted;
        } else if self.remaining.is_exhausted() {
            #[cfg(feature = "tracing")]
            tracing::debug!("repeat budget exhausted");
            self.phase = Phase::Exhausted;
            self.events.push(FlashEvent::Exhausted);
        } else {
            let count = self.config.strings.len();
            let next = self.config.selection.next(index, count, &mut self.rng);
            self.phase = Phase::Waiting {
                remaining: self.config.pause.delay(&mut self.rng),
                next,
            };
        }
    }

    /// Drain the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<FlashEvent> {
        std::mem::take(&mut self.events)
    }

    /// Observable playback state.
    pub fn state(&self) -> FlashState {
        match &self.phase {
            Phase::Cycle { envelope, .. } => match envelope.phase() {
                EnvelopePhase::FadeIn | EnvelopePhase::Hold => FlashState::Showing,
                EnvelopePhase::FadeOut | EnvelopePhase::Done => FlashState::Hiding,
            },
            Phase::Waiting { .. } => FlashState::Waiting,
            Phase::Halted => FlashState::Disabled,
            Phase::Exhausted => FlashState::Finished,
        }
    }

    /// Whether a cycle or pause is in progress.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Cycle { .. } | Phase::Waiting { .. })
    }

    /// Whether the repeat budget ran out and teardown is due.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.phase, Phase::Exhausted)
    }

    /// The live fragment, if a cycle is in progress.
    pub fn fragment(&self) -> Option<&Fragment> {
        self.fragment.as_ref()
    }

    /// Current fragment opacity; 0.0 when no cycle is in progress.
    pub fn opacity(&self) -> f32 {
        if let Phase::Cycle { envelope, .. } = &self.phase {
            envelope.opacity()
        } else {
            0.0
        }
    }

    /// Index of the most recently shown string.
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Cycles left to play.
    pub fn remaining(&self) -> Repeat {
        self.remaining
    }

    /// The stage's config copy.
    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Update the stage's content-box size.
    ///
    /// Applies to subsequent fragment placements; the live fragment keeps
    /// its position.
    pub fn set_stage_size(&mut self, size: Size) {
        self.stage = size;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
