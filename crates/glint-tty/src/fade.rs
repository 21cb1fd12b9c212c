#![forbid(unsafe_code)]

//! Opacity and weight mapping for flashed text.
//!
//! Cell grids cannot change glyph geometry mid-frame, so the two visual
//! knobs a fragment carries are translated here: opacity becomes a blend
//! toward the pane background, and the sampled font size becomes an
//! attribute tier (dim, normal, bold).

use glint_core::FontRange;

/// Terminal-friendly RGB triple.
pub type Rgb = (u8, u8, u8);

// =============================================================================
// Color utilities
// =============================================================================

/// Interpolate between two colors.
pub fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    (
        (a.0 as f32 + (b.0 as f32 - a.0 as f32) * t) as u8,
        (a.1 as f32 + (b.1 as f32 - a.1 as f32) * t) as u8,
        (a.2 as f32 + (b.2 as f32 - a.2 as f32) * t) as u8,
    )
}

/// Scale a color's brightness by `opacity`.
///
/// Equivalent to compositing over black. Use [`fade_over`] when the pane
/// background is not black.
pub fn apply_opacity(color: Rgb, opacity: f32) -> Rgb {
    let opacity = opacity.clamp(0.0, 1.0);
    (
        (color.0 as f32 * opacity) as u8,
        (color.1 as f32 * opacity) as u8,
        (color.2 as f32 * opacity) as u8,
    )
}

/// Composite `fg` over `bg` at the given opacity.
///
/// Opacity 0 yields `bg` exactly, opacity 1 yields `fg` exactly.
pub fn fade_over(fg: Rgb, bg: Rgb, opacity: f32) -> Rgb {
    mix(bg, fg, opacity)
}

// =============================================================================
// Size-to-weight mapping
// =============================================================================

/// Weight tier a fragment is drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    /// Bottom third of the font range. Rendered dim.
    Faint,
    /// Middle third of the font range.
    #[default]
    Normal,
    /// Top third of the font range. Rendered bold.
    Strong,
}

/// Map a sampled font size to its weight tier.
///
/// A degenerate range (`min == max`) always maps to [`Emphasis::Normal`].
pub fn emphasis_for(size: f32, font: &FontRange) -> Emphasis {
    let span = font.max - font.min;
    if span <= 0.0 {
        return Emphasis::Normal;
    }
    let t = ((size - font.min) / span).clamp(0.0, 1.0);
    if t < 1.0 / 3.0 {
        Emphasis::Faint
    } else if t < 2.0 / 3.0 {
        Emphasis::Normal
    } else {
        Emphasis::Strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px_range(min: f32, max: f32) -> FontRange {
        FontRange {
            min,
            max,
            unit: "px".to_string(),
        }
    }

    #[test]
    fn half_opacity_halves_channels() {
        assert_eq!(apply_opacity((200, 100, 50), 0.5), (100, 50, 25));
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(apply_opacity((200, 100, 50), 1.5), (200, 100, 50));
        assert_eq!(apply_opacity((200, 100, 50), -0.5), (0, 0, 0));
    }

    #[test]
    fn fade_over_hits_both_endpoints() {
        let fg = (240, 200, 120);
        let bg = (10, 20, 30);
        assert_eq!(fade_over(fg, bg, 1.0), fg);
        assert_eq!(fade_over(fg, bg, 0.0), bg);
    }

    #[test]
    fn fade_over_midpoint_blends() {
        let blended = fade_over((200, 200, 200), (0, 0, 0), 0.5);
        assert_eq!(blended, (100, 100, 100));
    }

    #[test]
    fn mix_is_monotone_in_t() {
        let a = (0, 0, 0);
        let b = (255, 255, 255);
        let low = mix(a, b, 0.25);
        let high = mix(a, b, 0.75);
        assert!(low.0 < high.0);
    }

    #[test]
    fn emphasis_tiers_cover_the_range() {
        let font = px_range(10.0, 40.0);
        assert_eq!(emphasis_for(10.0, &font), Emphasis::Faint);
        assert_eq!(emphasis_for(19.9, &font), Emphasis::Faint);
        assert_eq!(emphasis_for(25.0, &font), Emphasis::Normal);
        assert_eq!(emphasis_for(30.1, &font), Emphasis::Strong);
        assert_eq!(emphasis_for(40.0, &font), Emphasis::Strong);
    }

    #[test]
    fn degenerate_range_is_normal() {
        let font = px_range(16.0, 16.0);
        assert_eq!(emphasis_for(16.0, &font), Emphasis::Normal);
    }

    #[test]
    fn out_of_range_sizes_clamp_to_the_edge_tiers() {
        let font = px_range(10.0, 40.0);
        assert_eq!(emphasis_for(5.0, &font), Emphasis::Faint);
        assert_eq!(emphasis_for(90.0, &font), Emphasis::Strong);
    }
}
