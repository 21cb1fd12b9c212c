#![forbid(unsafe_code)]

//! Stage lifecycle management.
//!
//! A [`FlashManager`] owns the effect across any number of stages: it
//! validates options once, resolves each stage's string set, hands every
//! stage its own config copy and RNG stream, and dispatches the lifecycle
//! operations (enable, disable, toggle, destroy) over stage ids. The host
//! drives it from a single timer via [`FlashManager::tick`] and applies the
//! drained [`StageEvent`]s to its own visual tree.
//!
//! Events are collected into an internal queue and drained by the caller;
//! this avoids callback closures and keeps the API pure.
//!
//! # Invariants
//!
//! 1. Nothing animates before validation passes: a rejected init emits no
//!    events and registers no stages.
//! 2. Each stage gets its own config copy at init; later option edits by
//!    the host never leak into running stages.
//! 3. `Activated` is the first event a stage emits and `Restored` the last;
//!    a destroyed id is never seen again.
//! 4. A stage that finishes its last budgeted cycle while enabled is
//!    destroyed within the same tick.
//!
//! # Failure Modes
//!
//! - Invalid options: [`ConfigError`] from init, naming the field.
//! - Unknown command string: [`UnknownCommandError`] from dispatch.
//! - Operations on unknown or destroyed ids: ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::{ConfigError, FlashOptions};
use crate::engine::{FlashEvent, FlashState, Flasher};
use crate::fragment::{Fragment, Measure, Size};
use crate::rng::Rng;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Unique identifier for a registered stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub u64);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage-{}", self.0)
    }
}

/// A host container to run the effect over.
#[derive(Debug, Clone, Default)]
pub struct StageDesc {
    /// Content-box size, in the host's units.
    pub size: Size,
    /// How fragment extents derive from text and size.
    pub measure: Measure,
    /// The container's pre-existing content, one string per child. Used to
    /// derive the string set when the options carry none; the host hides
    /// these while the effect runs and re-shows them on `Restored`.
    pub children: Vec<String>,
}

impl StageDesc {
    /// Describe a stage of the given size with no children.
    #[must_use]
    pub fn new(size: Size, measure: Measure) -> Self {
        Self {
            size,
            measure,
            children: Vec::new(),
        }
    }

    /// Set the container's pre-existing content (builder).
    #[must_use]
    pub fn children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }
}

/// A lifecycle side effect for the host to apply to its visual tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// The stage was claimed: mark the container as an effect surface and
    /// hide its native children.
    Activated { id: StageId },
    /// A fragment appeared; render it at its position, updating opacity
    /// from [`FlashManager::active_fragment`] every frame.
    Shown { id: StageId, fragment: Fragment },
    /// The stage's fragment was removed.
    Hidden { id: StageId },
    /// The stage was released: restore container styling and child
    /// visibility.
    Restored { id: StageId },
}

/// A lifecycle operation addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    Toggle,
    Destroy,
}

impl FromStr for Command {
    type Err = UnknownCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "toggle" => Ok(Self::Toggle),
            "destroy" => Ok(Self::Destroy),
            other => Err(UnknownCommandError(other.to_string())),
        }
    }
}

/// A command string named no known lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommandError(pub String);

impl fmt::Display for UnknownCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command {:?}", self.0)
    }
}

impl std::error::Error for UnknownCommandError {}

// ---------------------------------------------------------------------------
// FlashManager
// ---------------------------------------------------------------------------

/// The effect across all registered stages.
pub struct FlashManager {
    stages: BTreeMap<StageId, Flasher>,
    next_id: u64,
    events: Vec<StageEvent>,
    rng: Rng,
}

impl fmt::Debug for FlashManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashManager")
            .field("stages", &self.stages.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Default for FlashManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashManager {
    /// Create a manager seeded from the clock.
    #[must_use]
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        Self::with_seed(seed)
    }

    /// Create a manager with a fixed seed; identical seeds and identical
    /// call sequences reproduce identical runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            stages: BTreeMap::new(),
            next_id: 0,
            events: Vec::new(),
            rng: Rng::new(seed),
        }
    }

    /// Register stages and start the effect on each of them.
    ///
    /// Validates `options` once, then resolves every stage's string set:
    /// the explicit list when present, otherwise the stage's own children
    /// (rejected with [`ConfigError::MissingStrings`] if any stage has
    /// none). On success each stage holds its own config copy and, when
    /// enabled, has its first cycle running. Returns the minted ids in
    /// the order the descriptors were given.
    ///
    /// On error nothing is registered and no events are emitted.
    pub fn init(
        &mut self,
        stages: Vec<StageDesc>,
        options: &FlashOptions,
    ) -> Result<Vec<StageId>, ConfigError> {
        options.validate()?;
        let mut sets = Vec::with_capacity(stages.len());
        for desc in &stages {
            let set = match &options.strings {
                Some(strings) => strings.clone(),
                None if desc.children.is_empty() => return Err(ConfigError::MissingStrings),
                None => desc.children.clone(),
            };
            sets.push(set);
        }

        let mut ids = Vec::with_capacity(stages.len());
        for (desc, strings) in stages.into_iter().zip(sets) {
            let id = StageId(self.next_id);
            self.next_id += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(%id, "stage activated");
            self.events.push(StageEvent::Activated { id });
            let config = options.to_config(strings);
            let mut flasher = Flasher::new(config, desc.size, desc.measure, self.rng.split(id.0));
            Self::pump(&mut self.events, id, &mut flasher);
            self.stages.insert(id, flasher);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Resume the given stages; see [`Flasher::enable`]. Unknown ids are
    /// ignored.
    pub fn enable(&mut self, ids: &[StageId]) {
        for &id in ids {
            if let Some(flasher) = self.stages.get_mut(&id) {
                flasher.enable();
                Self::pump(&mut self.events, id, flasher);
            }
        }
    }

    /// Halt the given stages; see [`Flasher::disable`]. Unknown ids are
    /// ignored.
    pub fn disable(&mut self, ids: &[StageId]) {
        for &id in ids {
            if let Some(flasher) = self.stages.get_mut(&id) {
                flasher.disable();
                Self::pump(&mut self.events, id, flasher);
            }
        }
    }

    /// Per stage: disable when running, enable when halted.
    pub fn toggle(&mut self, ids: &[StageId]) {
        for &id in ids {
            if let Some(flasher) = self.stages.get_mut(&id) {
                if flasher.is_running() {
                    flasher.disable();
                } else {
                    flasher.enable();
                }
                Self::pump(&mut self.events, id, flasher);
            }
        }
    }

    /// Release the given stages.
    ///
    /// Any live fragment is removed immediately (no graceful fade-out), a
    /// final `Restored` is emitted, and the id is dropped. Unknown or
    /// already-destroyed ids are ignored.
    pub fn destroy(&mut self, ids: &[StageId]) {
        for &id in ids {
            self.remove_stage(id);
        }
    }

    /// Apply a lifecycle operation by name.
    ///
    /// Accepts `"enable"`, `"disable"`, `"toggle"`, and `"destroy"`;
    /// anything else is rejected without touching any stage. Init is the
    /// typed entry point, not a named command.
    pub fn dispatch(&mut self, command: &str, ids: &[StageId]) -> Result<(), UnknownCommandError> {
        match command.parse::<Command>()? {
            Command::Enable => self.enable(ids),
            Command::Disable => self.disable(ids),
            Command::Toggle => self.toggle(ids),
            Command::Destroy => self.destroy(ids),
        }
        Ok(())
    }

    /// Advance every stage by `dt` and tear down the ones whose repeat
    /// budget ran out.
    pub fn tick(&mut self, dt: Duration) {
        let mut done = Vec::new();
        for (&id, flasher) in &mut self.stages {
            flasher.tick(dt);
            Self::pump(&mut self.events, id, flasher);
            if flasher.is_exhausted() {
                done.push(id);
            }
        }
        for id in done {
            self.remove_stage(id);
        }
    }

    /// Drain the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.events)
    }

    /// The stage's live fragment and its current opacity, for hosts that
    /// redraw every frame.
    pub fn active_fragment(&self, id: StageId) -> Option<(&Fragment, f32)> {
        let flasher = self.stages.get(&id)?;
        let fragment = flasher.fragment()?;
        Some((fragment, flasher.opacity()))
    }

    /// Observable playback state, or `None` for unknown ids.
    pub fn state(&self, id: StageId) -> Option<FlashState> {
        self.stages.get(&id).map(Flasher::state)
    }

    /// Whether the stage exists and a cycle or pause is in progress.
    pub fn is_running(&self, id: StageId) -> bool {
        self.stages.get(&id).is_some_and(Flasher::is_running)
    }

    /// Ids of all registered stages, in creation order.
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.keys().copied().collect()
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Update a stage's content-box size after a host resize. Applies to
    /// subsequent fragment placements.
    pub fn set_stage_size(&mut self, id: StageId, size: Size) {
        if let Some(flasher) = self.stages.get_mut(&id) {
            flasher.set_stage_size(size);
        }
    }

    fn pump(events: &mut Vec<StageEvent>, id: StageId, flasher: &mut Flasher) {
        for event in flasher.drain_events() {
            match event {
                FlashEvent::Shown(fragment) => events.push(StageEvent::Shown { id, fragment }),
                FlashEvent::Hidden => events.push(StageEvent::Hidden { id }),
                // Exhaustion is handled by the manager, not the host.
                FlashEvent::Exhausted => {}
            }
        }
    }

    fn remove_stage(&mut self, id: StageId) {
        if let Some(mut flasher) = self.stages.remove(&id) {
            Self::pump(&mut self.events, id, &mut flasher);
            if flasher.fragment().is_some() {
                self.events.push(StageEvent::Hidden { id });
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(%id, "stage restored");
            self.events.push(StageEvent::Restored { id });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
