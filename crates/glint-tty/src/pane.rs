#![forbid(unsafe_code)]

//! Bordered screen regions that stages render into.
//!
//! A [`StagePane`] owns a rectangle of the terminal and turns stage content
//! into [`TextRun`]s: a box-drawing frame, the static child lines, and the
//! live fragment composited at its current opacity. Runs are plain data so
//! layout stays testable without a terminal.
//!
//! Panes assume grid-measured stages: fragment coordinates are taken as
//! cell offsets into the content box, which is the pane inset by one cell
//! of border on each side.

use glint_core::{FontRange, Fragment, Size};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::fade::{Emphasis, Rgb, emphasis_for, fade_over};

/// Colors a pane draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Frame and title color.
    pub border: Rgb,
    /// Static child lines.
    pub body: Rgb,
    /// Flash fragments at full opacity.
    pub accent: Rgb,
    /// What fragments fade toward. Should match the cleared screen color.
    pub background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            border: (95, 95, 115),
            body: (170, 170, 180),
            accent: (240, 200, 120),
            background: (0, 0, 0),
        }
    }
}

/// A horizontal styled span ready to be queued to the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub color: Rgb,
    pub emphasis: Emphasis,
}

/// Screen rectangle a single stage renders into.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePane {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub palette: Palette,
}

impl StagePane {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
            palette: Palette::default(),
        }
    }

    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Width of the content box inside the border.
    pub fn content_width(&self) -> u16 {
        self.width.saturating_sub(2)
    }

    /// Height of the content box inside the border.
    pub fn content_height(&self) -> u16 {
        self.height.saturating_sub(2)
    }

    /// Content box extent as a stage size, for seeding stage descriptors.
    pub fn stage_size(&self) -> Size {
        Size::new(f32::from(self.content_width()), f32::from(self.content_height()))
    }

    /// Frame runs, with `title` set into the top border when it fits.
    pub fn frame_runs(&self, title: &str) -> Vec<TextRun> {
        if self.width < 2 || self.height < 2 {
            return Vec::new();
        }
        let border = self.palette.border;
        let dashes = "─".repeat(usize::from(self.width - 2));
        let bottom_y = self.y.saturating_add(self.height - 1);
        let right_x = self.x.saturating_add(self.width - 1);

        let mut runs = vec![
            TextRun {
                x: self.x,
                y: self.y,
                text: format!("┌{dashes}┐"),
                color: border,
                emphasis: Emphasis::Normal,
            },
            TextRun {
                x: self.x,
                y: bottom_y,
                text: format!("└{dashes}┘"),
                color: border,
                emphasis: Emphasis::Normal,
            },
        ];

        for row in 1..self.height - 1 {
            let y = self.y.saturating_add(row);
            for x in [self.x, right_x] {
                runs.push(TextRun {
                    x,
                    y,
                    text: "│".to_string(),
                    color: border,
                    emphasis: Emphasis::Normal,
                });
            }
        }

        if !title.is_empty() {
            let label = format!("[{title}]");
            if label.width() + 2 <= usize::from(self.width) {
                runs.push(TextRun {
                    x: self.x.saturating_add(1),
                    y: self.y,
                    text: label,
                    color: border,
                    emphasis: Emphasis::Normal,
                });
            }
        }

        runs
    }

    /// One run per child line, stacked from the top of the content box.
    ///
    /// Lines past the bottom are dropped and overlong lines get an ellipsis.
    pub fn children_runs(&self, children: &[String]) -> Vec<TextRun> {
        let max_cols = usize::from(self.content_width());
        if max_cols == 0 {
            return Vec::new();
        }
        let origin_x = self.x.saturating_add(1);
        let origin_y = self.y.saturating_add(1);

        children
            .iter()
            .take(usize::from(self.content_height()))
            .enumerate()
            .filter_map(|(row, child)| {
                let text = clip_with_ellipsis(child, max_cols);
                if text.is_empty() {
                    return None;
                }
                Some(TextRun {
                    x: origin_x,
                    y: origin_y.saturating_add(row as u16),
                    text,
                    color: self.palette.body,
                    emphasis: Emphasis::Normal,
                })
            })
            .collect()
    }

    /// The live fragment as a run, composited at `opacity`.
    ///
    /// Returns `None` when the content box cannot hold any of the text.
    pub fn fragment_run(
        &self,
        fragment: &Fragment,
        opacity: f32,
        font: &FontRange,
    ) -> Option<TextRun> {
        let max_cols = usize::from(self.content_width());
        let rows = self.content_height();
        if max_cols == 0 || rows == 0 {
            return None;
        }

        let text = clip_to_width(&fragment.text, max_cols);
        if text.is_empty() {
            return None;
        }
        let cols = text.width() as u16;

        // Rounding may push an edge-hugging fragment one cell past the box.
        let max_x = self.content_width().saturating_sub(cols);
        let fx = (fragment.x.round().max(0.0) as u16).min(max_x);
        let fy = (fragment.y.round().max(0.0) as u16).min(rows - 1);

        Some(TextRun {
            x: self.x.saturating_add(1).saturating_add(fx),
            y: self.y.saturating_add(1).saturating_add(fy),
            text,
            color: fade_over(self.palette.accent, self.palette.background, opacity),
            emphasis: emphasis_for(fragment.size, font),
        })
    }
}

/// Clip `text` to at most `max_cols` terminal columns without splitting a
/// grapheme.
pub fn clip_to_width(text: &str, max_cols: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > max_cols {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out
}

fn clip_with_ellipsis(text: &str, max_cols: usize) -> String {
    if text.width() <= max_cols {
        return text.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }
    let mut out = clip_to_width(text, max_cols - 1);
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Measure, Rng};

    fn px_range() -> FontRange {
        FontRange {
            min: 7.0,
            max: 28.0,
            unit: "px".to_string(),
        }
    }

    fn fragment_at(x: f32, y: f32, text: &str) -> Fragment {
        Fragment {
            text: text.to_string(),
            x,
            y,
            width: text.width() as f32,
            height: 1.0,
            size: 16.0,
        }
    }

    #[test]
    fn frame_outlines_the_box() {
        let pane = StagePane::new(0, 0, 10, 4);
        let runs = pane.frame_runs("");
        assert_eq!(runs.len(), 6, "top, bottom, and two side rows");

        assert_eq!(runs[0].text, "┌────────┐");
        assert_eq!((runs[0].x, runs[0].y), (0, 0));
        assert_eq!(runs[1].text, "└────────┘");
        assert_eq!((runs[1].x, runs[1].y), (0, 3));

        let sides: Vec<_> = runs[2..].iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(sides, vec![(0, 1), (9, 1), (0, 2), (9, 2)]);
    }

    #[test]
    fn title_sits_on_the_top_border() {
        let pane = StagePane::new(2, 1, 20, 5);
        let runs = pane.frame_runs("flash");
        let title = runs.last().unwrap();
        assert_eq!(title.text, "[flash]");
        assert_eq!((title.x, title.y), (3, 1));
    }

    #[test]
    fn narrow_pane_drops_the_title() {
        let pane = StagePane::new(0, 0, 6, 3);
        let runs = pane.frame_runs("much too long");
        assert!(runs.iter().all(|r| !r.text.starts_with('[')));
    }

    #[test]
    fn degenerate_pane_renders_no_frame() {
        assert!(StagePane::new(0, 0, 1, 1).frame_runs("x").is_empty());
        assert!(StagePane::new(0, 0, 0, 4).frame_runs("x").is_empty());
    }

    #[test]
    fn children_stack_from_the_top() {
        let pane = StagePane::new(0, 0, 12, 5);
        let children = vec![
            "one".to_string(),
            "a very long child line".to_string(),
            "three".to_string(),
            "dropped".to_string(),
        ];
        let runs = pane.children_runs(&children);
        assert_eq!(runs.len(), 3, "only three content rows");
        assert_eq!((runs[0].x, runs[0].y), (1, 1));
        assert_eq!((runs[2].x, runs[2].y), (1, 3));
        assert_eq!(runs[1].text, "a very lo…");
        assert_eq!(runs[1].text.width(), 10);
    }

    #[test]
    fn cjk_clipping_never_splits_a_wide_char() {
        assert_eq!(clip_to_width("你好世界", 5), "你好");
        assert_eq!(clip_to_width("你好世界", 4), "你好");
        assert_eq!(clip_to_width("ab你好", 3), "ab");
    }

    #[test]
    fn fragment_run_projects_into_the_content_box() {
        let pane = StagePane::new(4, 2, 20, 6);
        let run = pane
            .fragment_run(&fragment_at(3.0, 1.0, "hey"), 1.0, &px_range())
            .unwrap();
        assert_eq!((run.x, run.y), (4 + 1 + 3, 2 + 1 + 1));
        assert_eq!(run.text, "hey");
    }

    #[test]
    fn fragment_run_clamps_rounding_overshoot() {
        let pane = StagePane::new(0, 0, 10, 4);
        // Content box is 8 wide; x rounds to 6 which would spill past it.
        let run = pane
            .fragment_run(&fragment_at(5.6, 9.0, "abc"), 1.0, &px_range())
            .unwrap();
        assert!(run.x + run.text.width() as u16 <= 9, "stays inside the frame");
        assert_eq!(run.y, 2, "y clamps to the last content row");
    }

    #[test]
    fn fragment_run_fades_between_background_and_accent() {
        let pane = StagePane::new(0, 0, 20, 5);
        let fragment = fragment_at(0.0, 0.0, "hi");
        let faded = pane.fragment_run(&fragment, 0.0, &px_range()).unwrap();
        assert_eq!(faded.color, pane.palette.background);
        let solid = pane.fragment_run(&fragment, 1.0, &px_range()).unwrap();
        assert_eq!(solid.color, pane.palette.accent);
    }

    #[test]
    fn fragment_run_is_none_when_no_room() {
        let pane = StagePane::new(0, 0, 2, 2);
        assert!(
            pane.fragment_run(&fragment_at(0.0, 0.0, "hi"), 1.0, &px_range())
                .is_none()
        );
    }

    #[test]
    fn spawned_fragments_fit_their_pane() {
        let pane = StagePane::new(0, 0, 30, 8);
        let font = px_range();
        let mut rng = Rng::new(31);
        for _ in 0..200 {
            let fragment = Fragment::spawn(
                "flashing".to_string(),
                pane.stage_size(),
                Measure::Grid,
                &font,
                &mut rng,
            );
            let run = pane.fragment_run(&fragment, 0.8, &font).unwrap();
            assert!(run.x >= 1 && run.y >= 1);
            assert!(run.x + run.text.width() as u16 <= pane.width - 1);
            assert!(run.y < pane.height - 1);
        }
    }
}
