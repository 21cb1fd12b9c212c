#![forbid(unsafe_code)]

//! Flashing-text effect engine.
//!
//! Transient text fragments fade in, hold, and fade out over host-owned
//! stages, drawn from a string list by a selection policy (random,
//! ascending, descending) with configurable timing, repeat counts, and
//! inter-cycle pauses. The engine is platform-agnostic and tick-driven:
//! the host calls [`FlashManager::tick`] from its one timer, renders via
//! [`FlashManager::active_fragment`], and applies drained [`StageEvent`]s
//! to its own visual tree.
//!
//! ```ignore
//! use std::time::Duration;
//! use glint_core::{FlashManager, FlashOptions, Measure, Selection, Size, StageDesc};
//!
//! let mut manager = FlashManager::new();
//! let options = FlashOptions::default()
//!     .strings(vec!["hello".into(), "world".into()])
//!     .selection(Selection::Ascending);
//! let ids = manager.init(vec![StageDesc::new(Size::new(80.0, 24.0), Measure::Grid)], &options)?;
//!
//! loop {
//!     manager.tick(Duration::from_millis(16));
//!     for event in manager.drain_events() { /* apply to the visual tree */ }
//!     if let Some((fragment, opacity)) = manager.active_fragment(ids[0]) { /* draw */ }
//! }
//! ```
//!
//! # Invariants
//!
//! 1. Nothing animates before [`FlashOptions::validate`] passes.
//! 2. Each stage owns a config copy and an independent RNG stream; stages
//!    never share mutable state.
//! 3. All progression happens inside `tick`; no threads, no timers, no
//!    wall clock. Identical seeds replay identical runs.
//! 4. Disable force-completes the in-flight cycle and halts; enable
//!    resumes by replaying the last shown string.

pub mod config;
pub mod controller;
pub mod engine;
pub mod envelope;
pub mod fragment;
pub mod rng;
pub mod selection;

pub use config::{
    ConfigError, FlashConfig, FlashOptions, FontRange, Pause, PauseSetting, RANDOM_PAUSE_MAX,
    Repeat,
};
pub use controller::{
    Command, FlashManager, StageDesc, StageEvent, StageId, UnknownCommandError,
};
pub use engine::{FlashEvent, FlashState, Flasher};
pub use envelope::{EasingFn, EnvelopePhase, FlashEnvelope, ease_in, ease_in_out, ease_out, linear};
pub use fragment::{FontMetrics, Fragment, Measure, Size};
pub use rng::Rng;
pub use selection::Selection;
