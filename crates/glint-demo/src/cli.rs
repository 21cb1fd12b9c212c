#![forbid(unsafe_code)]

//! Command-line argument parsing for the flash demo.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `GLINT_DEMO_*` prefix.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
glint-demo — flashing text over terminal panes

USAGE:
    glint-demo [OPTIONS]

OPTIONS:
    --text=STRING        Flash this string (repeatable; default: derive
                         from each pane's own lines)
    --selection=ORDER    'random' (default), 'ascending', or 'descending'
    --fade-in=MS         Fade-in length in milliseconds (default: 300)
    --hold=MS            Full-opacity hold in milliseconds (default: 500)
    --fade-out=MS        Fade-out length in milliseconds (default: 300)
    --repeat=N           Cycles per stage, or -1 for unlimited (default: -1)
    --pause=MS|random    Pause between cycles (default: 0)
    --font-range=MIN:MAX Font size sample range (default: 7:28)
    --panes=N            Number of stage panes, 1-8 (default: 2)
    --seed=N             RNG seed; 0 seeds from the clock (default: 0)
    --log-file=PATH      Append tracing output to PATH (otherwise silent)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    e               Enable all stages
    d               Disable all stages
    t               Toggle all stages
    x               Destroy all stages (panes keep their lines)
    r               Destroy and re-initialize all stages
    q / Esc / Ctrl+C  Quit

ENVIRONMENT VARIABLES:
    GLINT_DEMO_SEED           Override --seed
    GLINT_DEMO_LOG_FILE       Override --log-file
    GLINT_DEMO_EXIT_AFTER_MS  Auto-quit after N milliseconds (for testing)";

/// Parsed command-line options.
pub struct Opts {
    /// Strings to flash; empty means derive from pane lines.
    pub texts: Vec<String>,
    /// Selection order name, parsed later.
    pub selection: String,
    /// Fade-in length in milliseconds.
    pub fade_in_ms: f64,
    /// Hold length in milliseconds.
    pub hold_ms: f64,
    /// Fade-out length in milliseconds.
    pub fade_out_ms: f64,
    /// Cycle budget per stage (-1 = unlimited).
    pub repeat: i64,
    /// Pause setting, parsed later ("random" or milliseconds).
    pub pause: String,
    /// Smallest font size to sample.
    pub font_min: f32,
    /// Largest font size to sample.
    pub font_max: f32,
    /// Number of stage panes.
    pub panes: u16,
    /// RNG seed (0 = seed from the clock).
    pub seed: u64,
    /// Tracing output file.
    pub log_file: Option<String>,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            selection: "random".into(),
            fade_in_ms: 300.0,
            hold_ms: 500.0,
            fade_out_ms: 300.0,
            repeat: -1,
            pause: "0".into(),
            font_min: 7.0,
            font_max: 28.0,
            panes: 2,
            seed: 0,
            log_file: None,
            exit_after_ms: 0,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Ok(val) = env::var("GLINT_DEMO_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = n;
        }
        if let Ok(val) = env::var("GLINT_DEMO_LOG_FILE") {
            opts.log_file = Some(val);
        }
        if let Ok(val) = env::var("GLINT_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }

        // Parse command-line args (override env vars)
        let args: Vec<String> = env::args().skip(1).collect();
        for arg in &args {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("glint-demo {VERSION}");
                    process::exit(0);
                }
                other => {
                    if let Some(val) = other.strip_prefix("--text=") {
                        opts.texts.push(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--selection=") {
                        opts.selection = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--fade-in=") {
                        opts.fade_in_ms = parse_or_die(val, "--fade-in");
                    } else if let Some(val) = other.strip_prefix("--hold=") {
                        opts.hold_ms = parse_or_die(val, "--hold");
                    } else if let Some(val) = other.strip_prefix("--fade-out=") {
                        opts.fade_out_ms = parse_or_die(val, "--fade-out");
                    } else if let Some(val) = other.strip_prefix("--repeat=") {
                        opts.repeat = parse_or_die(val, "--repeat");
                    } else if let Some(val) = other.strip_prefix("--pause=") {
                        opts.pause = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--font-range=") {
                        match val.split_once(':') {
                            Some((min, max)) => {
                                opts.font_min = parse_or_die(min, "--font-range");
                                opts.font_max = parse_or_die(max, "--font-range");
                            }
                            None => {
                                eprintln!("Invalid --font-range value: {val} (want MIN:MAX)");
                                process::exit(1);
                            }
                        }
                    } else if let Some(val) = other.strip_prefix("--panes=") {
                        opts.panes = parse_or_die(val, "--panes");
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = parse_or_die(val, "--seed");
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_or_die(val, "--exit-after-ms");
                    } else {
                        eprintln!("Unknown argument: {other}");
                        eprintln!("Run with --help for usage information.");
                        process::exit(1);
                    }
                }
            }
        }

        opts
    }
}

fn parse_or_die<T: std::str::FromStr>(val: &str, flag: &str) -> T {
    match val.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Invalid {flag} value: {val}");
            process::exit(1);
        }
    }
}
