//! Line-diff renderer for a full-screen frame.

use crate::core::text::truncate_to_width;
use crate::render::Frame;

const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";
const CLEAR_ALL: &str = "\x1b[2J\x1b[H";
const SEGMENT_RESET: &str = "\x1b[0m";
const CLEAR_TO_EOL: &str = "\x1b[K";
const SHOW_CURSOR: &str = "\x1b[?25h";
const HIDE_CURSOR: &str = "\x1b[?25l";

/// Remembers the last frame so each render only rewrites changed rows.
#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous_lines: Vec<String>,
    previous_size: (usize, usize),
    force_full_redraw_next: bool,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the next render to clear the screen and redraw every row.
    pub fn request_full_redraw_next(&mut self) {
        self.force_full_redraw_next = true;
    }

    /// Produces the bytes that transform the previous screen into `frame`.
    ///
    /// Rows beyond `height` are dropped and rows wider than `width` are clipped.
    pub fn render(&mut self, frame: &Frame, width: usize, height: usize) -> String {
        let lines: Vec<String> = (0..height)
            .map(|row| {
                frame
                    .lines()
                    .get(row)
                    .map(|line| truncate_to_width(line, width, ""))
                    .unwrap_or_default()
            })
            .collect();

        let full = self.force_full_redraw_next || self.previous_size != (width, height);
        let mut buffer = String::from(SYNC_START);
        buffer.push_str(HIDE_CURSOR);
        if full {
            buffer.push_str(CLEAR_ALL);
        }

        for (row, line) in lines.iter().enumerate() {
            if !full && self.previous_lines.get(row) == Some(line) {
                continue;
            }
            buffer.push_str(&format!("\x1b[{};1H", row + 1));
            buffer.push_str(line);
            buffer.push_str(SEGMENT_RESET);
            buffer.push_str(CLEAR_TO_EOL);
        }

        if let Some(cursor) = frame.cursor() {
            let row = cursor.row.min(height.saturating_sub(1));
            let col = cursor.col.min(width.saturating_sub(1));
            buffer.push_str(&format!("\x1b[{};{}H", row + 1, col + 1));
            buffer.push_str(SHOW_CURSOR);
        }
        buffer.push_str(SYNC_END);

        self.previous_lines = lines;
        self.previous_size = (width, height);
        self.force_full_redraw_next = false;
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_render_clears_and_draws_every_row() {
        let mut renderer = DiffRenderer::new();
        let output = renderer.render(&Frame::new(vec!["a".into(), "b".into()]), 10, 3);

        assert!(output.starts_with(SYNC_START));
        assert!(output.contains(CLEAR_ALL));
        assert!(output.contains("\x1b[1;1Ha"));
        assert!(output.contains("\x1b[2;1Hb"));
        assert!(output.contains("\x1b[3;1H"));
        assert!(output.ends_with(SYNC_END));
    }

    #[test]
    fn unchanged_rows_are_skipped() {
        let mut renderer = DiffRenderer::new();
        renderer.render(&Frame::new(vec!["same".into(), "old".into()]), 10, 2);
        let output = renderer.render(&Frame::new(vec!["same".into(), "new".into()]), 10, 2);

        assert!(!output.contains(CLEAR_ALL));
        assert!(!output.contains("same"));
        assert!(output.contains("\x1b[2;1Hnew"));
    }

    #[test]
    fn resize_and_explicit_request_force_full_redraw() {
        let mut renderer = DiffRenderer::new();
        let frame = Frame::new(vec!["x".into()]);
        renderer.render(&frame, 10, 1);
        assert!(renderer.render(&frame, 12, 1).contains(CLEAR_ALL));

        renderer.request_full_redraw_next();
        assert!(renderer.render(&frame, 12, 1).contains("\x1b[1;1Hx"));
    }

    #[test]
    fn cursor_is_placed_and_shown() {
        let mut renderer = DiffRenderer::new();
        let output = renderer.render(&Frame::new(vec!["> hi".into()]).with_cursor(0, 4), 10, 2);
        assert!(output.ends_with(&format!("\x1b[1;5H{SHOW_CURSOR}{SYNC_END}")));
    }

    #[test]
    fn wide_lines_are_clipped() {
        let mut renderer = DiffRenderer::new();
        let output = renderer.render(&Frame::new(vec!["abcdefgh".into()]), 4, 1);
        assert!(output.contains("\x1b[1;1Habcd\x1b[0m"));
    }
}
