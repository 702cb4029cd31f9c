//! String and comment ranges of a file.
//!
//! The engine treats these as given facts. `annotate` produces them with a
//! single left-to-right scan driven by a `LanguageSpec`'s delimiters; the
//! longest opener wins wherever several match (`"""` before `"`, `/*` before
//! `/`).

use crate::language::LanguageSpec;
use crate::position::{Position, Range, SourceFile};
use serde::Serialize;

const ESCAPE: char = '\\';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationSet {
    pub strings: Vec<Range>,
    pub comments: Vec<Range>,
}

impl AnnotationSet {
    pub fn new(strings: Vec<Range>, comments: Vec<Range>) -> Self {
        Self { strings, comments }
    }

    /// Strings and comments together, in no particular order.
    pub fn literals(&self) -> impl Iterator<Item = &Range> {
        self.strings.iter().chain(self.comments.iter())
    }

    pub fn in_literal(&self, position: Position) -> bool {
        self.literals().any(|range| range.contains(position))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct {
    LineComment,
    BlockComment,
    String,
    MultilineString,
}

struct Opener<'a> {
    open: &'a str,
    close: &'a str,
    construct: Construct,
}

pub fn annotate(file: &SourceFile, language: &LanguageSpec) -> AnnotationSet {
    let mut openers: Vec<Opener<'_>> = Vec::new();
    for open in &language.comment_delimiters {
        openers.push(Opener {
            open,
            close: "\n",
            construct: Construct::LineComment,
        });
    }
    for (open, close) in &language.multiline_comment_delimiters {
        openers.push(Opener {
            open,
            close,
            construct: Construct::BlockComment,
        });
    }
    for (open, close) in &language.multiline_string_delimiters {
        openers.push(Opener {
            open,
            close,
            construct: Construct::MultilineString,
        });
    }
    for (open, close) in &language.string_delimiters {
        openers.push(Opener {
            open,
            close,
            construct: Construct::String,
        });
    }
    openers.retain(|opener| !opener.open.is_empty() && !opener.close.is_empty());
    // Stable: on equal length, comments beat strings.
    openers.sort_by(|a, b| b.open.len().cmp(&a.open.len()));

    let text = file.text();
    let mut annotations = AnnotationSet::default();
    let mut idx = 0;
    while idx < text.len() {
        let rest = &text[idx..];
        let Some(opener) = openers.iter().find(|opener| rest.starts_with(opener.open)) else {
            idx += rest.chars().next().map_or(1, char::len_utf8);
            continue;
        };

        let body = idx + opener.open.len();
        let end = match opener.construct {
            Construct::LineComment => text[idx..]
                .find(['\r', '\n'])
                .map_or(text.len(), |p| idx + p),
            Construct::BlockComment => text[body..]
                .find(opener.close)
                .map_or(text.len(), |p| body + p + opener.close.len()),
            Construct::MultilineString => {
                find_unescaped(text, body, opener.close, false)
                    .map_or(text.len(), |p| p + opener.close.len())
            }
            Construct::String => match find_unescaped(text, body, opener.close, true) {
                Some(p) => p + opener.close.len(),
                None => text[body..]
                    .find(['\r', '\n'])
                    .map_or(text.len(), |p| body + p),
            },
        };

        let last_char = text[..end]
            .char_indices()
            .next_back()
            .map_or(idx, |(p, _)| p.max(idx));
        let range = Range::new(file.position_at(idx), file.position_at(last_char));
        match opener.construct {
            Construct::LineComment | Construct::BlockComment => annotations.comments.push(range),
            Construct::String | Construct::MultilineString => annotations.strings.push(range),
        }
        idx = end.max(idx + opener.open.len());
    }
    annotations
}

/// Byte offset of the first occurrence of `needle` at or after `from` that is
/// not escaped. With `stop_at_newline`, gives up at the first line break.
fn find_unescaped(text: &str, from: usize, needle: &str, stop_at_newline: bool) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in text[from..].char_indices() {
        let at = from + offset;
        if escaped {
            escaped = false;
            continue;
        }
        if stop_at_newline && c == '\n' {
            return None;
        }
        if text[at..].starts_with(needle) {
            return Some(at);
        }
        if c == ESCAPE {
            escaped = true;
        }
    }
    None
}
