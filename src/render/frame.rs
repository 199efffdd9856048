//! Typed render model: a full-screen grid of styled lines plus a cursor.

/// Zero-based cursor position in frame coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// One screen's worth of already-styled lines.
///
/// Lines may contain SGR escape sequences; width is measured with
/// [`crate::core::text::visible_width`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    lines: Vec<String>,
    cursor: Option<CursorPos>,
}

impl Frame {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: None,
        }
    }

    #[must_use]
    pub fn with_cursor(mut self, row: usize, col: usize) -> Self {
        self.cursor = Some(CursorPos { row, col });
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> Option<CursorPos> {
        self.cursor
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
