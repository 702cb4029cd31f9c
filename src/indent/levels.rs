use crate::blocks::BlockRange;
use crate::position::SourceFile;
use tracing::warn;

/// Indentation level of every line of `file`, given all block ranges.
///
/// A block raises the level of the lines after its start line and lowers it
/// again after its end line. When the end line itself begins with one of
/// `closing_tokens` (a lone `}`), that line is already dedented.
///
/// Malformed input can drive the running level below zero; such lines are
/// reported and clamped to zero.
pub fn levels(file: &SourceFile, ranges: &[BlockRange], closing_tokens: &[&str]) -> Vec<usize> {
    let mut sorted: Vec<&BlockRange> = ranges.iter().collect();
    sorted.sort_by_key(|block| block.start_line());

    let mut result = Vec::with_capacity(file.len());
    let mut next_indent: i64 = 0;
    for (idx, line) in file.lines().iter().enumerate() {
        let number = idx + 1;
        let mut indent = next_indent;
        let content = line.trim_start();
        let starts_with_close = closing_tokens
            .iter()
            .any(|token| !token.is_empty() && content.starts_with(token));

        for block in &sorted {
            if block.start_line() == number {
                next_indent += 1;
            }
            if block.end_line() == number {
                if starts_with_close {
                    indent -= 1;
                }
                next_indent -= 1;
            }
        }

        if indent < 0 {
            warn!(line = number, level = indent, "negative indentation level, clamping to 0");
        }
        result.push(usize::try_from(indent).unwrap_or(0));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Range;

    fn block(start_line: usize, end_line: usize) -> BlockRange {
        BlockRange {
            range: Range::from_values(start_line, 1, end_line, 1),
            open: "{".to_string(),
            close: "}".to_string(),
        }
    }

    #[test]
    fn test_closing_line_dedents_itself() {
        let file = SourceFile::from_text("f() {\nx;\n}\n");
        assert_eq!(levels(&file, &[block(1, 3)], &["}"]), vec![0, 1, 0]);
    }

    #[test]
    fn test_inferred_block_dedents_after_end_line() {
        let file = SourceFile::from_text("if x:\ny = 1\nz = 2\n");
        assert_eq!(levels(&file, &[block(1, 2)], &[]), vec![0, 1, 0]);
    }

    #[test]
    fn test_same_line_close_and_open() {
        let file = SourceFile::from_text("if (a) {\nb;\n} else {\nc;\n}\n");
        let ranges = [block(3, 5), block(1, 3)];
        assert_eq!(levels(&file, &ranges, &["}"]), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_single_line_block_changes_nothing() {
        let file = SourceFile::from_text("a { }\nb\n");
        assert_eq!(levels(&file, &[block(1, 1)], &["}"]), vec![0, 0]);
    }

    #[test]
    fn test_negative_levels_are_clamped() {
        let file = SourceFile::from_text("}\n}\nx\n");
        assert_eq!(levels(&file, &[block(1, 1), block(1, 2)], &["}"]), vec![0, 0, 0]);
    }
}
