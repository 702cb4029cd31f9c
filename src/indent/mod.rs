//! # Indentation
//!
//! Rebuilds the indentation of a whole file from its block structure and
//! reports every contiguous group of lines whose indentation would change.
//!
//! The pipeline is:
//! 1. resolve encapsulator ranges (`(`…`)`), whose interiors are excluded
//!    from block detection and get a hanging indent of their own;
//! 2. resolve block ranges for every indent type, paired when the language
//!    names a close token and inferred from de-indentation when it does not;
//! 3. compute the level of every line ([`levels`]);
//! 4. render the file at those levels and overlay hanging indents
//!    ([`reindent`]);
//! 5. diff the rendering against the original.

pub mod hanging;
pub mod levels;
pub mod reindent;


pub use hanging::{HangingRange, hanging_indent, hanging_ranges};
pub use levels::levels;
pub use reindent::{IndentStyle, reindent};

use crate::annotation::AnnotationSet;
use crate::blocks::{BlockRange, StructureError, inferred_ranges, paired_ranges};
use crate::check::{Check, CheckContext, CheckError};
use crate::diff::Diff;
use crate::language::LanguageSpec;
use crate::position::{Range, SourceFile};
use crate::result::{LintResult, Severity};
use tracing::debug;

pub const ORIGIN: &str = "indentation";
const MESSAGE: &str = "The indentation could be changed to improve readability.";

#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationCheck {
    pub style: IndentStyle,
}

impl IndentationCheck {
    pub fn new(use_spaces: bool, tab_width: usize) -> Self {
        Self {
            style: IndentStyle {
                use_spaces,
                tab_width,
            },
        }
    }

    /// The file as it would read with corrected indentation, one entry per
    /// original line.
    pub fn render(
        &self,
        file: &SourceFile,
        annotations: &AnnotationSet,
        language: &LanguageSpec,
    ) -> Result<Vec<String>, StructureError> {
        let mut encapsulators: Vec<BlockRange> = Vec::new();
        for (open, close) in &language.encapsulators {
            encapsulators.extend(paired_ranges(file, open, close, annotations)?);
        }
        encapsulators.sort_by_key(|block| block.range.start);
        let encapsulator_spans: Vec<Range> = encapsulators.iter().map(|block| block.range).collect();

        let comment_openers = language.comment_openers();
        let mut blocks: Vec<BlockRange> = Vec::new();
        for (open, close) in &language.indent_types {
            if close.is_empty() {
                blocks.extend(inferred_ranges(
                    file,
                    open,
                    annotations,
                    &encapsulator_spans,
                    &comment_openers,
                )?);
            } else {
                blocks.extend(paired_ranges(file, open, close, annotations)?);
            }
        }
        debug!(
            blocks = blocks.len(),
            encapsulators = encapsulators.len(),
            "resolved block structure"
        );

        let line_levels = levels(file, &blocks, &language.closing_tokens());
        let hanging = hanging_ranges(file, &encapsulators);
        let mut lines = reindent(file, &line_levels, &hanging, self.style);

        // Whitespace at the start of a string's continuation line is part of the string.
        for string in &annotations.strings {
            for number in string.start.line + 1..=string.end.line {
                if let (Some(slot), Some(original)) = (lines.get_mut(number - 1), file.line(number)) {
                    *slot = original.to_string();
                }
            }
        }
        Ok(lines)
    }
}

impl Check for IndentationCheck {
    fn name(&self) -> &'static str {
        ORIGIN
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<LintResult>, CheckError> {
        if self.style.tab_width == 0 {
            return Err(CheckError::Configuration(
                "tab_width must be at least 1.".to_string(),
            ));
        }
        if ctx.language.indent_types.is_empty() {
            return Err(CheckError::Configuration(format!(
                "Language '{}' defines no indent types.",
                ctx.language.name
            )));
        }

        let lines = self.render(ctx.file, ctx.annotations, ctx.language)?;
        let whole = Diff::from_line_arrays(ctx.file.lines(), &lines);
        let results = whole
            .split()
            .into_iter()
            .map(|diff| {
                let mut result = LintResult::new(ORIGIN, Severity::Info, MESSAGE);
                if let Some(range) = diff.affected_range() {
                    result = result.with_affected(range);
                }
                result.with_diff(ctx.filename, diff)
            })
            .collect();
        Ok(results)
    }
}
