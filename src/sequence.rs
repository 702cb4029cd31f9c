//! # Literal-Aware Sequence Finder
//!
//! Finds occurrences of a delimiter or marker in a file while ignoring every
//! occurrence that sits inside a string or comment. Callers can additionally
//! exclude occurrences inside other ranges (encapsulator interiors) and ask
//! for only those occurrences that end their line.

use crate::annotation::AnnotationSet;
use crate::position::{Position, Range, SourceFile};

const ESCAPE: char = '\\';

/// Optional constraints for [`find_sequences`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceFilter<'a> {
    /// Occurrences inside any of these ranges are dropped.
    pub exclusions: &'a [Range],
    /// Keep only occurrences that end their line once same-line comments and
    /// trailing whitespace are removed.
    pub must_end_line: bool,
}

/// All valid occurrences of `pattern`, in document order.
pub fn find_sequences(
    file: &SourceFile,
    pattern: &str,
    annotations: &AnnotationSet,
    filter: SequenceFilter<'_>,
) -> Vec<Position> {
    unescaped_matches(file.text(), pattern)
        .into_iter()
        .map(|offset| file.position_at(offset))
        .filter(|&position| !annotations.in_literal(position))
        .filter(|&position| !filter.exclusions.iter().any(|range| range.contains(position)))
        .filter(|&position| {
            !filter.must_end_line || ends_line(file, position, pattern, &annotations.comments)
        })
        .collect()
}

/// Byte offsets of non-overlapping matches of `pattern` that are not preceded
/// by an odd number of escape characters.
pub(crate) fn unescaped_matches(text: &str, pattern: &str) -> Vec<usize> {
    if pattern.is_empty() {
        return Vec::new();
    }
    text.match_indices(pattern)
        .map(|(offset, _)| offset)
        .filter(|&offset| {
            let escapes = text[..offset]
                .chars()
                .rev()
                .take_while(|&c| c == ESCAPE)
                .count();
            escapes % 2 == 0
        })
        .collect()
}

fn ends_line(file: &SourceFile, position: Position, pattern: &str, comments: &[Range]) -> bool {
    let Some(line) = file.line(position.line) else {
        return false;
    };
    let single_line_comments: Vec<&Range> = comments
        .iter()
        .filter(|c| c.start.line == position.line && c.end.line == position.line)
        .collect();

    let code: String = line
        .chars()
        .enumerate()
        .filter(|&(idx, _)| {
            let column = idx + 1;
            !single_line_comments
                .iter()
                .any(|c| c.start.column <= column && column <= c.end.column)
        })
        .map(|(_, c)| c)
        .collect();
    code.trim_end().ends_with(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_literals() -> AnnotationSet {
        AnnotationSet::default()
    }

    #[test]
    fn test_finds_all_occurrences_in_order() {
        let file = SourceFile::from_text("a { b {\n} }\n");
        let found = find_sequences(&file, "{", &no_literals(), SequenceFilter::default());
        assert_eq!(found, vec![Position::new(1, 3), Position::new(1, 7)]);
    }

    #[test]
    fn test_skips_occurrences_in_strings_and_comments() {
        let file = SourceFile::from_text("f(\"(\") # (\n(x)\n");
        let annotations = AnnotationSet::new(
            vec![Range::from_values(1, 3, 1, 5)],
            vec![Range::from_values(1, 8, 1, 10)],
        );
        let found = find_sequences(&file, "(", &annotations, SequenceFilter::default());
        assert_eq!(found, vec![Position::new(1, 2), Position::new(2, 1)]);
    }

    #[test]
    fn test_skips_escaped_occurrences() {
        let file = SourceFile::from_text("a \\{ b \\\\{ c\n");
        let found = find_sequences(&file, "{", &no_literals(), SequenceFilter::default());
        assert_eq!(found, vec![Position::new(1, 10)]);
    }

    #[test]
    fn test_respects_exclusion_ranges() {
        let file = SourceFile::from_text("d = {a: 1,\n     b: 2}\nif x:\n");
        let exclusions = [Range::from_values(1, 5, 2, 10)];
        let filter = SequenceFilter {
            exclusions: &exclusions,
            must_end_line: false,
        };
        let found = find_sequences(&file, ":", &no_literals(), filter);
        assert_eq!(found, vec![Position::new(3, 5)]);
    }

    #[test]
    fn test_must_end_line_ignores_trailing_comment() {
        let file = SourceFile::from_text("if a:  # why\nf = lambda x: x\nelse:   \n");
        let annotations = AnnotationSet::new(vec![], vec![Range::from_values(1, 8, 1, 12)]);
        let filter = SequenceFilter {
            exclusions: &[],
            must_end_line: true,
        };
        let found = find_sequences(&file, ":", &annotations, filter);
        assert_eq!(found, vec![Position::new(1, 5), Position::new(3, 5)]);
    }

    #[test]
    fn test_multi_line_comment_is_not_stripped_for_line_end_check() {
        let file = SourceFile::from_text("if a: /* open\nclose */\n");
        let annotations = AnnotationSet::new(vec![], vec![Range::from_values(1, 7, 2, 8)]);
        let filter = SequenceFilter {
            exclusions: &[],
            must_end_line: true,
        };
        assert!(find_sequences(&file, ":", &annotations, filter).is_empty());
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let file = SourceFile::from_text("abc\n");
        assert!(find_sequences(&file, "", &no_literals(), SequenceFilter::default()).is_empty());
    }
}
