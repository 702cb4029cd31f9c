use super::hanging::HangingRange;
use crate::position::{SourceFile, leading_whitespace, line_terminator};

/// How one indentation level is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentStyle {
    pub use_spaces: bool,
    pub tab_width: usize,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self {
            use_spaces: true,
            tab_width: 4,
        }
    }
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        if self.use_spaces {
            " ".repeat(self.tab_width)
        } else {
            "\t".to_string()
        }
    }
}

/// Renders `file` with every line's indentation rebuilt from `levels`, then
/// overlays the hanging alignment of each encapsulator.
///
/// Inside an encapsulator every line gets the opening line's indentation plus
/// the hanging indent and one unit per extra level, except a line starting
/// with the close token, which lines up with the opening line itself.
///
/// Lines keep their content and terminators; whitespace-only lines are
/// reduced to their terminator.
pub fn reindent(
    file: &SourceFile,
    levels: &[usize],
    hanging: &[HangingRange],
    style: IndentStyle,
) -> Vec<String> {
    let unit = style.unit();
    let level_of = |line: usize| levels.get(line - 1).copied().unwrap_or(0);

    let mut lines: Vec<String> = file
        .lines()
        .iter()
        .enumerate()
        .map(|(idx, line)| with_indent(line, &unit.repeat(level_of(idx + 1))))
        .collect();

    let mut sorted: Vec<&HangingRange> = hanging.iter().collect();
    sorted.sort_by_key(|hanging| hanging.block.range.start);
    for hanging in sorted {
        let opening_line = hanging.block.start_line();
        let Some(opening) = lines.get(opening_line - 1) else {
            continue;
        };
        let base = leading_whitespace(opening).to_string();
        let opening_level = level_of(opening_line);

        for number in opening_line + 1..=hanging.block.end_line().min(lines.len()) {
            let slot = &mut lines[number - 1];
            let closes = !hanging.block.close.is_empty()
                && slot.trim_start().starts_with(hanging.block.close.as_str());
            let indent = if closes {
                base.clone()
            } else {
                let extra = level_of(number).saturating_sub(opening_level);
                format!("{base}{}{}", " ".repeat(hanging.indent), unit.repeat(extra))
            };
            *slot = with_indent(slot, &indent);
        }
    }
    lines
}

/// Replaces the leading whitespace of `line` with `indent`.
fn with_indent(line: &str, indent: &str) -> String {
    let content = line.trim_start_matches(|c: char| c.is_whitespace() && c != '\n' && c != '\r');
    if content.trim().is_empty() {
        return line_terminator(line).to_string();
    }
    format!("{indent}{content}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockRange;
    use crate::position::Range;
    use pretty_assertions::assert_eq;

    fn paren(range: Range, indent: usize) -> HangingRange {
        HangingRange {
            block: BlockRange {
                range,
                open: "(".to_string(),
                close: ")".to_string(),
            },
            indent,
        }
    }

    #[test]
    fn test_rebuilds_indent_from_levels() {
        let file = SourceFile::from_text("if x:\n y = 1\n\t\tz\nw\n");
        let lines = reindent(&file, &[0, 1, 2, 0], &[], IndentStyle::default());
        assert_eq!(lines, vec!["if x:\n", "    y = 1\n", "        z\n", "w\n"]);
    }

    #[test]
    fn test_tabs() {
        let file = SourceFile::from_text("a\n  b\n");
        let style = IndentStyle {
            use_spaces: false,
            tab_width: 8,
        };
        assert_eq!(reindent(&file, &[0, 1], &[], style), vec!["a\n", "\tb\n"]);
    }

    #[test]
    fn test_blank_lines_keep_only_terminator() {
        let file = SourceFile::from_text("a\n    \r\n  \n   ");
        let lines = reindent(&file, &[0, 1, 1, 1], &[], IndentStyle::default());
        assert_eq!(lines, vec!["a\n", "\r\n", "\n", ""]);
    }

    #[test]
    fn test_hanging_overlay_aligns_wrapped_lines() {
        let file = SourceFile::from_text("  x = foo(a,\nb,\n  c)\n");
        let hanging = [paren(Range::from_values(1, 10, 3, 4), 8)];
        let lines = reindent(&file, &[1, 1, 1], &hanging, IndentStyle::default());
        assert_eq!(
            lines,
            vec!["    x = foo(a,\n", "            b,\n", "            c)\n"]
        );
    }

    #[test]
    fn test_closing_token_line_aligns_with_opening_line() {
        let file = SourceFile::from_text("foo(\n  a,\n      )\n");
        let hanging = [paren(Range::from_values(1, 4, 3, 7), 2)];
        let lines = reindent(&file, &[0, 0, 0], &hanging, IndentStyle::default());
        assert_eq!(lines, vec!["foo(\n", "  a,\n", ")\n"]);
    }

    #[test]
    fn test_nested_blocks_inside_encapsulator_add_levels() {
        let file = SourceFile::from_text("f(function() {\nx;\n});\n");
        let hanging = [paren(Range::from_values(1, 2, 3, 2), 2)];
        let lines = reindent(&file, &[0, 1, 0], &hanging, IndentStyle::default());
        assert_eq!(lines, vec!["f(function() {\n", "      x;\n", "  });\n"]);
    }
}
