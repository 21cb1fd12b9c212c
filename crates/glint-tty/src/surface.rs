#![forbid(unsafe_code)]

//! Terminal surface lifecycle guard.
//!
//! Owns raw-mode entry/exit, the alternate screen, and cursor visibility
//! for the duration of a flash session, restoring everything on drop.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Drop restores previous state** - cursor shown, alternate screen
//!    left, raw mode disabled, in reverse order of enabling.
//!
//! 2. **Panic safety** - a process-wide panic hook performs best-effort
//!    restoration before the default hook prints the message, so a panic
//!    inside the draw loop does not leave the shell in raw mode.
//!
//! 3. **Signal safety (unix)** - SIGINT/SIGTERM restore the terminal and
//!    exit with the conventional `128 + signal` status.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::fade::Emphasis;
use crate::pane::TextRun;

/// A terminal surface holding raw mode, the alternate screen, and a hidden
/// cursor until dropped.
///
/// Only one `Surface` should exist at a time.
#[derive(Debug)]
pub struct Surface {
    /// Track what was enabled so we can disable on drop.
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl Surface {
    /// Enter raw mode, switch to the alternate screen, and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if any terminal mode change fails; modes enabled
    /// before the failure are rolled back by the drop of the partial guard.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        let mut surface = Self {
            alternate_screen_enabled: false,
            cursor_hidden: false,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();
        crossterm::execute!(stdout, terminal::EnterAlternateScreen)?;
        surface.alternate_screen_enabled = true;
        #[cfg(feature = "tracing")]
        tracing::info!("alternate screen enabled");

        crossterm::execute!(stdout, cursor::Hide)?;
        surface.cursor_hidden = true;

        Ok(surface)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Poll for an input event with a timeout.
    ///
    /// Returns `Ok(true)` if an event is available, `Ok(false)` on timeout.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next input event (blocking until available).
    pub fn read_event(&self) -> io::Result<Event> {
        crossterm::event::read()
    }

    /// Clear the whole screen.
    pub fn clear(&mut self) -> io::Result<()> {
        queue!(
            io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            SetAttribute(Attribute::Reset)
        )
    }

    /// Queue the given runs and flush them to the terminal.
    ///
    /// Every run fully specifies its own color and weight, so run order
    /// only matters where runs overlap.
    pub fn draw(&mut self, runs: &[TextRun]) -> io::Result<()> {
        let mut stdout = io::stdout();
        for run in runs {
            let (r, g, b) = run.color;
            queue!(
                stdout,
                cursor::MoveTo(run.x, run.y),
                SetForegroundColor(Color::Rgb { r, g, b })
            )?;
            match run.emphasis {
                Emphasis::Faint => queue!(stdout, SetAttribute(Attribute::Dim))?,
                Emphasis::Normal => {}
                Emphasis::Strong => queue!(stdout, SetAttribute(Attribute::Bold))?,
            }
            queue!(stdout, Print(&run.text), SetAttribute(Attribute::Reset))?;
        }
        stdout.flush()
    }

    /// Cleanup helper (shared between drop and signal paths).
    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        // Exit raw mode last.
        let _ = terminal::disable_raw_mode();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_restore();
            previous(info);
        }));
    });
}

fn best_effort_restore() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, cursor::Show);
    let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGINT | SIGTERM => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("termination signal received, cleaning up");
                        best_effort_restore();
                        std::process::exit(128 + signal);
                    }
                    _ => {}
                }
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// Note: Tests that actually enter raw mode would interfere with the test
// runner's terminal state, so surface behavior is exercised through the demo
// binary rather than unit tests. Pure rendering logic lives in `pane` and
// `fade`, which are tested directly.
