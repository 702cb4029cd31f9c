//! # Casing
//!
//! Finds identifiers that do not follow a naming convention and proposes
//! whole-file renames for them.
//!
//! Identifiers are the pieces of code left after cutting the text at a
//! language's special characters and whitespace; strings and comments are
//! never looked at. Renames are resolved in the order their identifiers
//! first appear. A rename that would touch a line already changed by an
//! earlier accepted rename is rejected as a whole, so the accepted renames
//! can always be applied together.

pub mod convention;

pub use convention::CasingConvention;

use crate::annotation::AnnotationSet;
use crate::check::{Check, CheckContext, CheckError};
use crate::diff::Diff;
use crate::position::SourceFile;
use crate::result::{LintResult, Severity};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

pub const ORIGIN: &str = "casing";

/// One candidate rename with the lines it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameProposal {
    pub original: String,
    pub proposed: String,
    /// Whole-line replacements applying this rename and nothing else.
    pub diff: Diff,
    /// False when an earlier accepted rename already changed one of its lines.
    pub accepted: bool,
}

impl RenameProposal {
    pub fn lines(&self) -> BTreeSet<usize> {
        self.diff.lines().collect()
    }

    pub fn message(&self) -> String {
        let mut message = format!(
            "The following name change is suggested:\n- Change '{}' to '{}'",
            self.original, self.proposed
        );
        if self.diff.len() > 1 {
            message.push_str(&format!(": {} lines affected", self.diff.len()));
        }
        message
    }
}

/// Rename candidates for every identifier of `file` that `convert` respells,
/// in order of first appearance.
///
/// `keywords` are never renamed. `special_chars` together with whitespace
/// separate identifiers; an identifier must be bounded by them on both sides
/// to be replaced.
pub fn proposals<F>(
    file: &SourceFile,
    annotations: &AnnotationSet,
    keywords: &[String],
    special_chars: &str,
    convert: F,
) -> Result<Vec<RenameProposal>, CheckError>
where
    F: Fn(&str) -> String,
{
    let class = delimiter_class(special_chars);
    let splitter = regex::Regex::new(&format!("[{class}]+"))
        .map_err(|e| CheckError::Configuration(format!("Invalid special characters: {e}")))?;

    let masked = mask_literals(file, annotations);
    let masked_lines: Vec<&str> = file
        .lines()
        .iter()
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some(&masked[start..*offset])
        })
        .collect();

    let keywords: HashSet<&str> = keywords.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<(String, String)> = Vec::new();
    for token in masked_lines.iter().copied().flat_map(|line| splitter.split(line)) {
        if token.is_empty() || keywords.contains(token) || !seen.insert(token) {
            continue;
        }
        // Numeric literals like `0x1F` are not names.
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let proposed = convert(token);
        if proposed != token {
            candidates.push((token.to_string(), proposed));
        }
    }

    let mut touched: BTreeSet<usize> = BTreeSet::new();
    let mut result = Vec::with_capacity(candidates.len());
    for (original, proposed) in candidates {
        let pattern = fancy_regex::Regex::new(&format!(
            "(?<![^{class}]){}(?![^{class}])",
            fancy_regex::escape(&original)
        ))?;

        let mut diff = Diff::new();
        for (idx, (line, masked_line)) in file.lines().iter().zip(&masked_lines).enumerate() {
            let replaced = substitute(line, masked_line, &pattern, &proposed)?;
            if replaced != *line {
                diff.change_line(idx + 1, line.as_str(), replaced)
                    .map_err(|e| CheckError::Configuration(e.to_string()))?;
            }
        }

        let accepted = diff.lines().all(|line| !touched.contains(&line));
        if accepted {
            touched.extend(diff.lines());
        } else {
            debug!(original = %original, proposed = %proposed, "rename conflicts with an earlier one, skipping");
        }
        result.push(RenameProposal {
            original,
            proposed,
            diff,
            accepted,
        });
    }
    Ok(result)
}

/// Character class body matching any delimiter.
fn delimiter_class(special_chars: &str) -> String {
    let mut class: String = special_chars
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    class.push_str(" \\t\\n\\r");
    class
}

/// The file text with every string and comment character blanked out.
/// Byte offsets and line breaks are preserved.
fn mask_literals(file: &SourceFile, annotations: &AnnotationSet) -> String {
    let text = file.text();
    let mut blank = vec![false; text.len()];
    for range in annotations.literals() {
        let (start, end) = file.byte_span(range);
        for flag in &mut blank[start..end.min(text.len())] {
            *flag = true;
        }
    }
    let mut masked = String::with_capacity(text.len());
    for (offset, c) in text.char_indices() {
        if blank[offset] && c != '\n' && c != '\r' {
            masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    masked
}

/// Replaces every match of `pattern` in `masked` at the same byte offsets of
/// `line`.
fn substitute(
    line: &str,
    masked: &str,
    pattern: &fancy_regex::Regex,
    replacement: &str,
) -> Result<String, CheckError> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for found in pattern.find_iter(masked) {
        let found = found?;
        out.push_str(&line[last..found.start()]);
        out.push_str(replacement);
        last = found.end();
    }
    out.push_str(&line[last..]);
    Ok(out)
}

/// Reports identifiers that do not follow the configured naming convention.
#[derive(Debug, Clone)]
pub struct CasingCheck {
    /// Name of the convention, validated when the check runs.
    pub convention: String,
}

impl CasingCheck {
    pub fn new(convention: impl Into<String>) -> Self {
        Self {
            convention: convention.into(),
        }
    }
}

impl From<CasingConvention> for CasingCheck {
    fn from(convention: CasingConvention) -> Self {
        Self::new(convention.as_str())
    }
}

impl Check for CasingCheck {
    fn name(&self) -> &'static str {
        ORIGIN
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<LintResult>, CheckError> {
        let convention: CasingConvention =
            self.convention.parse().map_err(CheckError::Configuration)?;

        let (Some(keywords), Some(special_chars)) =
            (&ctx.language.keywords, &ctx.language.special_chars)
        else {
            return Err(CheckError::Configuration(format!(
                "Casing check did not run because 'keywords' and 'special_chars' are \
                 necessary fields that are missing in the language definition for {}",
                ctx.language.name
            )));
        };

        let proposals = proposals(
            ctx.file,
            ctx.annotations,
            keywords,
            special_chars,
            |token| convention.apply(token),
        )?;

        Ok(proposals
            .into_iter()
            .filter(|proposal| proposal.accepted)
            .map(|proposal| {
                let mut result = LintResult::new(ORIGIN, Severity::Normal, proposal.message());
                if let Some(range) = proposal.diff.affected_range() {
                    result = result.with_affected(range);
                }
                result.with_diff(ctx.filename, proposal.diff)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::annotate;
    use crate::language::{LanguageRegistry, LanguageSpec};
    use crate::position::Range;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SPECIAL: &str = "#,.:;()[]{}+-*/%=<>!&|^~@\"'\\";

    fn snake(token: &str) -> String {
        CasingConvention::Snake.apply(token)
    }

    fn renames(proposals: &[RenameProposal]) -> Vec<(&str, &str, bool)> {
        proposals
            .iter()
            .map(|p| (p.original.as_str(), p.proposed.as_str(), p.accepted))
            .collect()
    }

    fn python() -> LanguageSpec {
        LanguageRegistry::builtin().get("python").cloned().unwrap()
    }

    fn run_casing(source: &str, convention: &str, language: &LanguageSpec) -> Result<Vec<LintResult>, CheckError> {
        let file = SourceFile::from_text(source);
        let annotations = annotate(&file, language);
        let ctx = CheckContext {
            filename: Path::new("sample.py"),
            file: &file,
            annotations: &annotations,
            language,
        };
        CasingCheck::new(convention).run(&ctx)
    }

    #[test]
    fn test_renames_every_bounded_occurrence() {
        let file = SourceFile::from_text("myVar = 1\nprint(myVar+myVarX)\n");
        let found = proposals(&file, &AnnotationSet::default(), &[], SPECIAL, snake).unwrap();
        assert_eq!(
            renames(&found),
            vec![("myVar", "my_var", true), ("myVarX", "my_var_x", false)]
        );
        let changes: Vec<_> = found[0].diff.changes().map(|(_, c)| c.replacement.as_str()).collect();
        assert_eq!(changes, vec!["my_var = 1\n", "print(my_var+myVarX)\n"]);
    }

    #[test]
    fn test_conflicting_rename_is_rejected() {
        let source = "fooBar = 1\nbazQux = 2\nfooBar = bazQux\n";
        let file = SourceFile::from_text(source);
        let found = proposals(&file, &AnnotationSet::default(), &[], SPECIAL, snake).unwrap();
        assert_eq!(
            renames(&found),
            vec![("fooBar", "foo_bar", true), ("bazQux", "baz_qux", false)]
        );
        assert_eq!(found[0].lines(), BTreeSet::from([1, 3]));
        assert_eq!(found[1].lines(), BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_rejected_rename_does_not_block_later_ones() {
        let source = "aB = cD\ncD = 1\ncD = eF\n";
        let file = SourceFile::from_text(source);
        let found = proposals(&file, &AnnotationSet::default(), &[], SPECIAL, snake).unwrap();
        assert_eq!(
            renames(&found),
            vec![("aB", "a_b", true), ("cD", "c_d", false), ("eF", "e_f", true)]
        );
    }

    #[test]
    fn test_literals_are_neither_tokenized_nor_rewritten() {
        let source = "x = \"someName\"  # otherName\nsomeName = 2\n";
        let file = SourceFile::from_text(source);
        let annotations = AnnotationSet::new(
            vec![Range::from_values(1, 5, 1, 14)],
            vec![Range::from_values(1, 17, 1, 27)],
        );
        let found = proposals(&file, &annotations, &[], SPECIAL, snake).unwrap();
        assert_eq!(renames(&found), vec![("someName", "some_name", true)]);
        assert_eq!(found[0].lines(), BTreeSet::from([2]));
    }

    #[test]
    fn test_keywords_and_numbers_are_skipped() {
        let file = SourceFile::from_text("isDone = 0x1F\n");
        let keywords = vec!["isDone".to_string()];
        let found = proposals(&file, &AnnotationSet::default(), &keywords, SPECIAL, snake).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_identifiers_already_in_convention_give_nothing() {
        let file = SourceFile::from_text("my_var = other_var\n");
        let found = proposals(&file, &AnnotationSet::default(), &[], SPECIAL, snake).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_check_messages_and_severity() {
        let results = run_casing("my_var = 1\nprint(my_var)\nx_y = 2\n", "camel", &python()).unwrap();
        let messages: Vec<_> = results.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "The following name change is suggested:\n- Change 'my_var' to 'myVar': 2 lines affected",
                "The following name change is suggested:\n- Change 'x_y' to 'xY'",
            ]
        );
        assert!(results.iter().all(|r| r.severity == Severity::Normal && r.origin == ORIGIN));
        assert_eq!(results[0].affected.map(|r| r.start.line), Some(1));
        assert!(results[0].diffs.contains_key(Path::new("sample.py")));
    }

    #[test]
    fn test_python_strings_and_comments_are_untouched() {
        let source = "def doIt():  # keepThis\n    return 'notMe'\n";
        let results = run_casing(source, "snake", &python()).unwrap();
        assert_eq!(results.len(), 1);
        let diff = &results[0].diffs[Path::new("sample.py")];
        let changes: Vec<_> = diff.changes().map(|(_, c)| c.replacement.as_str()).collect();
        assert_eq!(changes, vec!["def do_it():  # keepThis\n"]);
    }

    #[test]
    fn test_invalid_convention_is_configuration_error() {
        let err = run_casing("x = 1\n", "kebab", &python()).unwrap_err();
        assert!(matches!(err, CheckError::Configuration(_)));
        assert_eq!(err.to_string(), "Invalid casing convention provided: kebab");
    }

    #[test]
    fn test_missing_language_fields_is_configuration_error() {
        let mut language = python();
        language.keywords = None;
        let err = run_casing("x = 1\n", "snake", &language).unwrap_err();
        assert!(matches!(err, CheckError::Configuration(_)));
        assert!(err.to_string().contains("python"));
    }
}
