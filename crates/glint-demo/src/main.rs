#![forbid(unsafe_code)]

//! Flashing-text demo binary.
//!
//! Splits the terminal into bordered panes, runs one flash stage over each,
//! and maps keys onto the stage lifecycle so every operation can be poked
//! interactively. Stage events go to a tracing log file when `--log-file`
//! is set; the terminal itself stays reserved for the effect.

mod cli;

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use glint_core::{
    ConfigError, FlashManager, FlashOptions, FontRange, Measure, PauseSetting, Selection,
    StageDesc, StageEvent, StageId,
};
use glint_tty::{Emphasis, StagePane, Surface, TextRun, clip_to_width};

/// Tick and redraw cadence.
const FRAME: Duration = Duration::from_millis(33);

/// Lines each pane shows when idle; also the default string set.
const CHILD_SETS: &[&[&str]] = &[
    &["The five boxing wizards", "jump quickly at dusk", "while the fog rolls in"],
    &["Sphinx of black quartz", "judge my vow tonight"],
    &["Pack my box with", "five dozen liquor jugs", "before the tide turns"],
    &["How vexingly quick", "daft zebras jump"],
];

fn main() {
    let opts = cli::Opts::parse();
    if let Err(e) = run(&opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &cli::Opts) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &opts.log_file {
        init_logging(path)?;
    }

    let options = flash_options(opts)?;
    options.validate()?;
    let font = FontRange {
        min: options.font_min,
        max: options.font_max,
        unit: options.font_unit.clone(),
    };

    let mut manager = match opts.seed {
        0 => FlashManager::new(),
        seed => FlashManager::with_seed(seed),
    };

    let count = opts.panes.clamp(1, 8);
    let children: Vec<Vec<String>> = (0..count).map(|i| children_for(usize::from(i))).collect();

    let mut surface = Surface::new()?;
    let (mut cols, mut rows) = surface.size()?;
    let mut panes = layout_panes(cols, rows, count);

    let mut stage_of_pane = manager.init(stage_descs(&panes, &children), &options)?;
    tracing::info!(stages = manager.len(), "flash session started");

    let started = Instant::now();
    let mut last_tick = Instant::now();
    let mut note = String::from("press t to toggle, q to quit");

    surface.clear()?;
    surface.draw(&compose(
        &panes,
        &children,
        &stage_of_pane,
        &manager,
        &font,
        (cols, rows),
        &note,
    ))?;

    loop {
        let timeout = FRAME.saturating_sub(last_tick.elapsed());
        if surface.poll_event(timeout)? {
            match surface.read_event()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let live = manager.stage_ids();
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        KeyCode::Char('e') => manager.enable(&live),
                        KeyCode::Char('d') => manager.disable(&live),
                        KeyCode::Char('t') => manager.toggle(&live),
                        KeyCode::Char('x') => manager.destroy(&live),
                        KeyCode::Char('r') => {
                            manager.destroy(&live);
                            stage_of_pane =
                                manager.init(stage_descs(&panes, &children), &options)?;
                        }
                        _ => {}
                    }
                }
                Event::Resize(new_cols, new_rows) => {
                    (cols, rows) = (new_cols, new_rows);
                    panes = layout_panes(cols, rows, count);
                    for (pane, id) in panes.iter().zip(&stage_of_pane) {
                        manager.set_stage_size(*id, pane.stage_size());
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick);
        if dt >= FRAME {
            manager.tick(dt);
            last_tick = now;

            for event in manager.drain_events() {
                tracing::debug!(event = ?event, "stage event");
                match &event {
                    StageEvent::Shown { id, fragment } => {
                        note = format!("{id} flashes {:?}", fragment.text);
                    }
                    StageEvent::Restored { id } => note = format!("{id} restored"),
                    _ => {}
                }
            }

            surface.clear()?;
            surface.draw(&compose(
                &panes,
                &children,
                &stage_of_pane,
                &manager,
                &font,
                (cols, rows),
                &note,
            ))?;
        }

        if opts.exit_after_ms > 0 && started.elapsed() >= Duration::from_millis(opts.exit_after_ms)
        {
            break;
        }
    }

    tracing::info!("flash session ended");
    Ok(())
}

/// Translate CLI options into flash options; string parsing happens here so
/// bad values are reported before the terminal is taken over.
fn flash_options(opts: &cli::Opts) -> Result<FlashOptions, ConfigError> {
    let mut options = FlashOptions::default()
        .selection(opts.selection.parse::<Selection>()?)
        .timing(opts.fade_in_ms, opts.hold_ms, opts.fade_out_ms)
        .repeat(opts.repeat)
        .pause(opts.pause.parse::<PauseSetting>()?)
        .font_range(opts.font_min, opts.font_max);
    if !opts.texts.is_empty() {
        options = options.strings(opts.texts.clone());
    }
    Ok(options)
}

fn init_logging(path: &str) -> Result<(), Box<dyn Error>> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Split the screen into `count` equal columns, keeping the last row for
/// the status line.
fn layout_panes(cols: u16, rows: u16, count: u16) -> Vec<StagePane> {
    let count = count.max(1);
    let height = rows.saturating_sub(1);
    let width = cols / count;
    (0..count)
        .map(|i| StagePane::new(i * width, 0, width, height))
        .collect()
}

fn children_for(i: usize) -> Vec<String> {
    CHILD_SETS[i % CHILD_SETS.len()]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn stage_descs(panes: &[StagePane], children: &[Vec<String>]) -> Vec<StageDesc> {
    panes
        .iter()
        .zip(children)
        .map(|(pane, lines)| {
            StageDesc::new(pane.stage_size(), Measure::Grid).children(lines.clone())
        })
        .collect()
}

/// One frame's worth of runs: every pane's chrome and children, live
/// fragments on top, status line last.
fn compose(
    panes: &[StagePane],
    children: &[Vec<String>],
    stage_of_pane: &[StageId],
    manager: &FlashManager,
    font: &FontRange,
    (cols, rows): (u16, u16),
    note: &str,
) -> Vec<TextRun> {
    let mut runs = Vec::new();
    for (i, pane) in panes.iter().enumerate() {
        let title = stage_of_pane
            .get(i)
            .map_or_else(|| format!("pane {i}"), ToString::to_string);
        runs.extend(pane.frame_runs(&title));
        if let Some(lines) = children.get(i) {
            runs.extend(pane.children_runs(lines));
        }
        if let Some(id) = stage_of_pane.get(i)
            && let Some((fragment, opacity)) = manager.active_fragment(*id)
        {
            runs.extend(pane.fragment_run(fragment, opacity, font));
        }
    }

    if rows > 0 {
        let text = format!("[e]nable [d]isable [t]oggle [x] destroy [r]estart [q]uit  {note}");
        runs.push(TextRun {
            x: 0,
            y: rows - 1,
            text: clip_to_width(&text, usize::from(cols)),
            color: (120, 120, 130),
            emphasis: Emphasis::Normal,
        });
    }

    runs
}
