#![forbid(unsafe_code)]

//! Terminal presentation for glint flash stages.
//!
//! [`Surface`] owns the terminal (raw mode, alternate screen, hidden
//! cursor) and flushes styled spans; [`StagePane`] turns stage content
//! into those spans; [`fade`] maps fragment opacity and sampled size onto
//! colors and attribute weights.
//!
//! Stages are small and redrawn whole each frame, so the crate draws with
//! plain [`TextRun`]s instead of a retained cell buffer.

pub mod fade;
pub mod pane;
pub mod surface;

pub use fade::{Emphasis, Rgb, apply_opacity, emphasis_for, fade_over, mix};
pub use pane::{Palette, StagePane, TextRun, clip_to_width};
pub use surface::Surface;
