use crate::blocks::BlockRange;
use crate::position::{SourceFile, indent_width};

/// An encapsulator together with the extra alignment its wrapped lines get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangingRange {
    pub block: BlockRange,
    /// Characters beyond the opening line's own indentation.
    pub indent: usize,
}

/// Column, relative to the opening line's indentation, that lines wrapped
/// inside `encapsulator` align to. Returns 0 when there is nothing to align to.
///
/// With content after the opening token (`f(a,`), wrapped lines align under
/// that content. With nothing after it (`f(`), the first wrapped line's own
/// indentation is kept.
pub fn hanging_indent(file: &SourceFile, encapsulator: &BlockRange) -> usize {
    let opening_line = encapsulator.start_line();
    let Some(line) = file.line(opening_line) else {
        return 0;
    };
    let start_indent = indent_width(line);
    let after_token = encapsulator.range.start.column + encapsulator.open.chars().count() - 1;

    let indent = if line.trim_end().chars().count() <= after_token {
        match file.line(opening_line + 1) {
            Some(next) => indent_width(next),
            None => return 0,
        }
    } else {
        after_token
    };

    indent.saturating_sub(start_indent)
}

/// Hanging indents for every encapsulator, in the order given.
pub fn hanging_ranges(file: &SourceFile, encapsulators: &[BlockRange]) -> Vec<HangingRange> {
    encapsulators
        .iter()
        .map(|block| HangingRange {
            block: block.clone(),
            indent: hanging_indent(file, block),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Range;

    fn paren(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> BlockRange {
        BlockRange {
            range: Range::from_values(start_line, start_column, end_line, end_column),
            open: "(".to_string(),
            close: ")".to_string(),
        }
    }

    #[test]
    fn test_aligns_under_first_element_on_opening_line() {
        let file = SourceFile::from_text("foo(a,\n    b)\n");
        assert_eq!(hanging_indent(&file, &paren(1, 4, 2, 6)), 4);
    }

    #[test]
    fn test_relative_to_opening_line_indent() {
        let file = SourceFile::from_text("    x = foo(a,\nb)\n");
        assert_eq!(hanging_indent(&file, &paren(1, 12, 2, 2)), 8);
    }

    #[test]
    fn test_uses_next_line_when_opener_ends_line() {
        let file = SourceFile::from_text("  foo(\n        a)\n");
        assert_eq!(hanging_indent(&file, &paren(1, 6, 2, 10)), 6);
    }

    #[test]
    fn test_trailing_whitespace_after_opener_is_ignored() {
        let file = SourceFile::from_text("foo(   \n  a)\n");
        assert_eq!(hanging_indent(&file, &paren(1, 4, 2, 4)), 2);
    }

    #[test]
    fn test_next_line_not_deeper_gives_zero() {
        let file = SourceFile::from_text("    foo(\n  a)\n");
        assert_eq!(hanging_indent(&file, &paren(1, 8, 2, 4)), 0);
    }

    #[test]
    fn test_opener_on_last_line_gives_zero() {
        let file = SourceFile::from_text("foo(");
        assert_eq!(hanging_indent(&file, &paren(1, 4, 1, 4)), 0);
    }

    #[test]
    fn test_multi_character_opener() {
        let block = BlockRange {
            range: Range::from_values(1, 5, 2, 6),
            open: "begin".to_string(),
            close: "end".to_string(),
        };
        let file = SourceFile::from_text("    begin x\n  end\n");
        assert_eq!(hanging_indent(&file, &block), 5);
    }
}
