//! # Position Model
//!
//! A `SourceFile` is an ordered sequence of lines, each keeping its own line
//! terminator, plus the concatenated text those lines form. Every range
//! computation in the crate goes through this module to translate between
//! byte offsets into the concatenated text and 1-based `(line, column)`
//! positions, where columns count characters rather than bytes.

use serde::Serialize;
use std::fmt;

/// A 1-based `(line, column)` location.
///
/// Field order matters: the derived ordering compares `line` first and then
/// `column`, which is exactly document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span within one file. Both ends are inclusive: `end` points at the last
/// character of the span (for a delimited construct, the last character of
/// its closing delimiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn from_values(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self::new(
            Position::new(start_line, start_column),
            Position::new(end_line, end_column),
        )
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// True if `line` is one of the lines after the first line of the range,
    /// up to and including its last line.
    pub fn continues_on(&self, line: usize) -> bool {
        self.start.line < line && line <= self.end.line
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Immutable, line-indexed view of a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    lines: Vec<String>,
    text: String,
    /// Byte offset in `text` at which each line starts.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.split_inclusive('\n'))
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut text = String::with_capacity(lines.iter().map(String::len).sum());
        for line in &lines {
            line_starts.push(text.len());
            text.push_str(line);
        }
        Self {
            lines,
            text,
            line_starts,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the 1-based line `number`, terminator included.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Converts a byte offset into the concatenated text to a position.
    /// Offsets past the end clamp to the position just after the last character.
    pub fn position_at(&self, offset: usize) -> Position {
        if self.lines.is_empty() {
            return Position::new(1, 1);
        }
        let offset = offset.min(self.text.len());
        let idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[idx];
        let column = self.text[line_start..offset].chars().count() + 1;
        Position::new(idx + 1, column)
    }

    /// Converts a position back into a byte offset. Columns past the end of
    /// their line clamp to the line's end.
    pub fn offset_of(&self, position: Position) -> usize {
        let Some(idx) = position.line.checked_sub(1) else {
            return 0;
        };
        let Some(line) = self.lines.get(idx) else {
            return self.text.len();
        };
        let within = line
            .char_indices()
            .nth(position.column.saturating_sub(1))
            .map_or(line.len(), |(byte, _)| byte);
        self.line_starts[idx] + within
    }

    /// Byte span `[start, end)` covered by an inclusive `Range`.
    pub fn byte_span(&self, range: &Range) -> (usize, usize) {
        let start = self.offset_of(range.start);
        let end_char = self.offset_of(range.end);
        let end = self.text[end_char..]
            .chars()
            .next()
            .map_or(end_char, |c| end_char + c.len_utf8());
        (start, end)
    }
}

/// Number of leading whitespace characters, not counting a line terminator.
pub fn indent_width(line: &str) -> usize {
    leading_whitespace(line).chars().count()
}

/// The leading run of spaces and tabs (or other non-newline whitespace).
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace() || c == '\n' || c == '\r')
        .map_or(line.len(), |(idx, _)| idx);
    &line[..end]
}

/// The line terminator (`"\n"`, `"\r\n"` or `""`) at the end of `line`.
pub fn line_terminator(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// True for lines that contain nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
