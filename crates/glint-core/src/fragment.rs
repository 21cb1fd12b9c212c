#![forbid(unsafe_code)]

//! Transient text fragments and their placement.
//!
//! Each cycle spawns one [`Fragment`]: the chosen string at a sampled font
//! size, positioned uniformly at random so it fits inside the stage's
//! content box. The fragment lives until its fade-out completes (or the
//! stage is disabled or destroyed) and is never persisted.
//!
//! Extents come from a [`Measure`]: pixel-like hosts scale a monospace
//! character-box model by the sampled size, cell hosts count display
//! columns and ignore the size for layout.

use unicode_width::UnicodeWidthStr;

use crate::config::FontRange;
use crate::rng::Rng;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A stage's content-box size, in the host's units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Monospace character-box ratios for pixel-like hosts.
///
/// A glyph at size `s` occupies roughly `s * char_width_ratio` horizontally
/// and `s * line_height_ratio` vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub char_width_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.11,
        }
    }
}

/// How a fragment's extent derives from its text and sampled size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Pixel-like host: extent scales with the sampled size.
    Scaled(FontMetrics),
    /// Cell host: extent is display columns by one row; the sampled size
    /// only affects styling.
    Grid,
}

impl Default for Measure {
    fn default() -> Self {
        Self::Scaled(FontMetrics::default())
    }
}

impl Measure {
    /// Width and height of `text` rendered at `size`.
    pub fn extent(&self, text: &str, size: f32) -> (f32, f32) {
        let columns = text.width() as f32;
        match self {
            Self::Scaled(metrics) => (
                columns * size * metrics.char_width_ratio,
                size * metrics.line_height_ratio,
            ),
            Self::Grid => (columns, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// One transient piece of flashed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The string being flashed.
    pub text: String,
    /// Left edge within the stage's content box.
    pub x: f32,
    /// Top edge within the stage's content box.
    pub y: f32,
    /// Rendered width.
    pub width: f32,
    /// Rendered height.
    pub height: f32,
    /// Sampled font size, in the config's unit.
    pub size: f32,
}

impl Fragment {
    /// Spawn a fragment for `text` somewhere inside `stage`.
    ///
    /// The size is sampled from `font`, the position uniformly from the
    /// range where the fragment fits fully. A fragment larger than the
    /// stage sits at the origin on that axis.
    pub fn spawn(
        text: String,
        stage: Size,
        measure: Measure,
        font: &FontRange,
        rng: &mut Rng,
    ) -> Self {
        let size = font.sample(rng);
        let (width, height) = measure.extent(&text, size);
        let x = place(stage.width, width, rng);
        let y = place(stage.height, height, rng);
        Self {
            text,
            x,
            y,
            width,
            height,
            size,
        }
    }
}

/// Uniform coordinate in `[0, container - extent)`, or 0 when the extent
/// does not fit.
fn place(container: f32, extent: f32, rng: &mut Rng) -> f32 {
    let max = container - extent;
    if max <= 0.0 { 0.0 } else { rng.range_f32(0.0, max) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // proptest's prelude re-exports the `rand::Rng` trait under the same
    // name; the explicit import keeps `Rng` bound to ours.
    use crate::rng::Rng;

    fn px_font() -> FontRange {
        FontRange {
            min: 7.0,
            max: 28.0,
            unit: "px".into(),
        }
    }

    #[test]
    fn grid_extent_counts_columns() {
        let (w, h) = Measure::Grid.extent("hello", 12.0);
        assert_eq!(w, 5.0);
        assert_eq!(h, 1.0);
    }

    #[test]
    fn grid_extent_uses_display_width() {
        // CJK characters occupy two columns each.
        let (w, _) = Measure::Grid.extent("你好", 12.0);
        assert_eq!(w, 4.0);
    }

    #[test]
    fn scaled_extent_follows_size() {
        let measure = Measure::Scaled(FontMetrics::default());
        let (w, h) = measure.extent("ab", 10.0);
        assert!((w - 12.0).abs() < 0.001); // 2 cols * 10.0 * 0.6
        assert!((h - 11.1).abs() < 0.001); // 10.0 * 1.11
    }

    #[test]
    fn spawn_fits_inside_stage() {
        let mut rng = Rng::new(21);
        let stage = Size::new(640.0, 480.0);
        for _ in 0..500 {
            let frag = Fragment::spawn(
                "blink".into(),
                stage,
                Measure::default(),
                &px_font(),
                &mut rng,
            );
            assert!(frag.x >= 0.0);
            assert!(frag.y >= 0.0);
            // Tolerance covers f32 rounding at the far edge.
            assert!(frag.x + frag.width <= stage.width + 0.001);
            assert!(frag.y + frag.height <= stage.height + 0.001);
        }
    }

    #[test]
    fn spawn_size_in_configured_range() {
        let mut rng = Rng::new(21);
        for _ in 0..500 {
            let frag = Fragment::spawn(
                "b".into(),
                Size::new(100.0, 100.0),
                Measure::default(),
                &px_font(),
                &mut rng,
            );
            assert!((7.0..28.0).contains(&frag.size), "size {}", frag.size);
        }
    }

    #[test]
    fn oversized_fragment_sits_at_origin() {
        let mut rng = Rng::new(21);
        let frag = Fragment::spawn(
            "far too wide for this stage".into(),
            Size::new(4.0, 0.5),
            Measure::Grid,
            &px_font(),
            &mut rng,
        );
        assert_eq!(frag.x, 0.0);
        assert_eq!(frag.y, 0.0);
    }

    #[test]
    fn exact_fit_sits_at_origin() {
        let mut rng = Rng::new(21);
        let stage = Size::new(4.0, 1.0);
        let frag = Fragment::spawn("abcd".into(), stage, Measure::Grid, &px_font(), &mut rng);
        assert_eq!(frag.x, 0.0);
        assert_eq!(frag.y, 0.0);
    }

    #[test]
    fn spawn_is_deterministic_per_seed() {
        let stage = Size::new(320.0, 200.0);
        let mut a = Rng::new(99);
        let mut b = Rng::new(99);
        let fa = Fragment::spawn("same".into(), stage, Measure::default(), &px_font(), &mut a);
        let fb = Fragment::spawn("same".into(), stage, Measure::default(), &px_font(), &mut b);
        assert_eq!(fa, fb);
    }

    proptest! {
        #[test]
        fn placement_never_escapes_container(
            container in 1.0_f32..2000.0,
            extent in 0.0_f32..2000.0,
            seed in 0_u64..1000,
        ) {
            let mut rng = Rng::new(seed);
            let pos = place(container, extent, &mut rng);
            prop_assert!(pos >= 0.0);
            if extent <= container {
                // Tolerance covers f32 rounding at the far edge.
                prop_assert!(pos + extent <= container + 0.001);
            } else {
                prop_assert_eq!(pos, 0.0);
            }
        }

        #[test]
        fn sampled_sizes_stay_in_range(
            min in 1.0_f32..50.0,
            span in 0.0_f32..50.0,
            seed in 0_u64..1000,
        ) {
            let mut rng = Rng::new(seed);
            let font = FontRange { min, max: min + span, unit: "px".into() };
            let size = font.sample(&mut rng);
            prop_assert!(size >= min);
            prop_assert!(size <= min + span + 0.001);
        }
    }
}
