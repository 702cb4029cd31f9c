//! # Block Range Resolver
//!
//! Turns indent markers and encapsulators into line spans.
//!
//! - With an explicit close token, opens and closes are paired by ordinary
//!   bracket matching (last opened, first closed).
//! - With no close token, a block starts at a marker that ends its line and
//!   runs until the first later line indented at or below the marker's line.
//!
//! Both resolvers return `StructureError` instead of guessing when the input
//! does not have a consistent structure.

use crate::annotation::AnnotationSet;
use crate::position::{Position, Range, SourceFile, indent_width, is_blank};
use crate::sequence::{SequenceFilter, find_sequences};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("Unmatched {open}, {close} pair")]
    UnmatchedDelimiters { open: String, close: String },
    #[error("Expected indent after line: {line}")]
    ExpectedIndent { line: usize },
}

/// A block span together with the rule (open/close tokens) that produced it.
/// `close` is empty for blocks whose end was inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRange {
    pub range: Range,
    pub open: String,
    pub close: String,
}

impl BlockRange {
    pub fn start_line(&self) -> usize {
        self.range.start.line
    }

    pub fn end_line(&self) -> usize {
        self.range.end.line
    }
}

/// Pairs every valid `open` with its matching `close`. Ranges are ordered by
/// start position; ranges sharing a start keep their closing order.
pub fn paired_ranges(
    file: &SourceFile,
    open: &str,
    close: &str,
    annotations: &AnnotationSet,
) -> Result<Vec<BlockRange>, StructureError> {
    let unmatched = || StructureError::UnmatchedDelimiters {
        open: open.to_string(),
        close: close.to_string(),
    };

    let opens = find_sequences(file, open, annotations, SequenceFilter::default());
    let closes = find_sequences(file, close, annotations, SequenceFilter::default());
    if opens.len() != closes.len() {
        return Err(unmatched());
    }

    let mut pending = opens.into_iter().peekable();
    let mut stack: Vec<Position> = Vec::new();
    let mut ranges = Vec::with_capacity(closes.len());
    for close_position in closes {
        while let Some(open_position) = pending.next_if(|&p| p <= close_position) {
            stack.push(open_position);
        }
        let open_position = stack.pop().ok_or_else(unmatched)?;
        ranges.push(BlockRange {
            range: Range::new(open_position, close_position),
            open: open.to_string(),
            close: close.to_string(),
        });
    }

    ranges.sort_by_key(|block| block.range.start);
    Ok(ranges)
}

/// Blocks opened by `open` at the end of a line whose end is found by
/// de-indentation. Markers inside `encapsulators` are ignored, and lines inside
/// encapsulators or multi-line literals never end a block.
pub fn inferred_ranges(
    file: &SourceFile,
    open: &str,
    annotations: &AnnotationSet,
    encapsulators: &[Range],
    comment_openers: &[&str],
) -> Result<Vec<BlockRange>, StructureError> {
    let filter = SequenceFilter {
        exclusions: encapsulators,
        must_end_line: true,
    };

    let mut ranges = Vec::new();
    for marker in find_sequences(file, open, annotations, filter) {
        let indent = marker_indent(file, marker.line, encapsulators);
        let unindent = first_unindent(file, indent, marker.line, annotations, encapsulators, comment_openers);
        let body_end = unindent - 1;

        let has_body = (marker.line + 1..=body_end)
            .filter_map(|number| file.line(number))
            .any(|line| !is_blank(line));
        if !has_body {
            return Err(StructureError::ExpectedIndent { line: marker.line });
        }

        ranges.push(BlockRange {
            range: Range::new(marker, Position::new(body_end, last_column(file, body_end))),
            open: open.to_string(),
            close: String::new(),
        });
    }
    Ok(ranges)
}

/// Indentation of the line holding a marker. When the marker closes off an
/// encapsulator that began on an earlier line (a wrapped signature), the
/// encapsulator's opening line is used instead.
fn marker_indent(file: &SourceFile, line: usize, encapsulators: &[Range]) -> usize {
    let start = encapsulators
        .iter()
        .filter(|encapsulator| encapsulator.end.line == line)
        .map(|encapsulator| encapsulator.start.line)
        .min()
        .map_or(line, |start| start.min(line));
    file.line(start).map_or(0, indent_width)
}

/// 1-based number of the first line after `marker_line` that is indented at
/// or below `indent`, or `file.len() + 1` when the block runs to the end.
fn first_unindent(
    file: &SourceFile,
    indent: usize,
    marker_line: usize,
    annotations: &AnnotationSet,
    encapsulators: &[Range],
    comment_openers: &[&str],
) -> usize {
    for (idx, line) in file.lines().iter().enumerate().skip(marker_line) {
        let number = idx + 1;
        if is_blank(line) {
            continue;
        }
        if annotations.literals().any(|literal| literal.continues_on(number)) {
            continue;
        }
        let content = line.trim_start();
        if comment_openers.iter().any(|opener| content.starts_with(opener)) {
            continue;
        }
        if encapsulators.iter().any(|encapsulator| encapsulator.continues_on(number)) {
            continue;
        }
        if indent_width(line) <= indent {
            return number;
        }
    }
    file.len() + 1
}

fn last_column(file: &SourceFile, line: usize) -> usize {
    file.line(line)
        .map_or(1, |text| text.trim_end_matches(['\r', '\n']).chars().count().max(1))
}
