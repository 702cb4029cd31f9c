use crate::position::{Position, Range};
use console::style;
use serde::Serialize;
use similar::{DiffTag, TextDiff};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("Line {0} is already changed by this diff")]
    LineAlreadyChanged(usize),
}

/// A whole-line replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    pub original: String,
    pub replacement: String,
}

/// An ordered set of whole-line replacements against one file, keyed by
/// 1-based line number. A line is changed at most once per diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    changes: BTreeMap<usize, LineChange>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares two renderings of the same file line by line. Both slices are
    /// expected to hold the same number of lines.
    pub fn from_line_arrays(original: &[String], modified: &[String]) -> Self {
        debug_assert_eq!(original.len(), modified.len());
        let changes = original
            .iter()
            .zip(modified)
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(idx, (old, new))| {
                (
                    idx + 1,
                    LineChange {
                        original: old.clone(),
                        replacement: new.clone(),
                    },
                )
            })
            .collect();
        Self { changes }
    }

    pub fn change_line(
        &mut self,
        line: usize,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), DiffError> {
        if self.changes.contains_key(&line) {
            return Err(DiffError::LineAlreadyChanged(line));
        }
        self.changes.insert(
            line,
            LineChange {
                original: original.into(),
                replacement: replacement.into(),
            },
        );
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> impl Iterator<Item = (usize, &LineChange)> {
        self.changes.iter().map(|(&line, change)| (line, change))
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.changes.keys().copied()
    }

    pub fn first_line(&self) -> Option<usize> {
        self.changes.keys().next().copied()
    }

    /// Splits the diff into maximal runs of consecutive changed lines.
    pub fn split(&self) -> Vec<Diff> {
        let mut groups: Vec<Diff> = Vec::new();
        let mut previous: Option<usize> = None;
        for (&line, change) in &self.changes {
            let continues = previous.is_some_and(|p| p + 1 == line);
            match groups.last_mut() {
                Some(group) if continues => {
                    group.changes.insert(line, change.clone());
                }
                _ => {
                    let mut group = Diff::new();
                    group.changes.insert(line, change.clone());
                    groups.push(group);
                }
            }
            previous = Some(line);
        }
        groups
    }

    /// The span from the first column of the first changed line to the end of
    /// the last changed line.
    pub fn affected_range(&self) -> Option<Range> {
        let (&first, _) = self.changes.first_key_value()?;
        let (&last, change) = self.changes.last_key_value()?;
        let last_column = change
            .original
            .trim_end_matches(['\r', '\n'])
            .chars()
            .count()
            .max(1);
        Some(Range::new(
            Position::new(first, 1),
            Position::new(last, last_column),
        ))
    }

    /// Applies the replacements to `lines`. Changes pointing past the end are
    /// ignored.
    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        let mut result = lines.to_vec();
        for (&line, change) in &self.changes {
            if let Some(slot) = line.checked_sub(1).and_then(|idx| result.get_mut(idx)) {
                *slot = change.replacement.clone();
            }
        }
        result
    }

    /// Human-readable, colored listing of the change.
    pub fn render(&self) -> String {
        if self.changes.is_empty() {
            return "No changes detected.".to_string();
        }

        let numbers: Vec<usize> = self.changes.keys().copied().collect();
        let old_content: Vec<&str> = self
            .changes
            .values()
            .map(|c| c.original.trim_end_matches(['\r', '\n']))
            .collect();
        let new_content: Vec<&str> = self
            .changes
            .values()
            .map(|c| c.replacement.trim_end_matches(['\r', '\n']))
            .collect();

        let diff = TextDiff::from_slices(&old_content, &new_content);
        let mut diff_lines = Vec::new();
        for op in diff.ops() {
            let (tag, old_range, new_range) = (op.tag(), op.old_range(), op.new_range());
            match tag {
                DiffTag::Equal => {
                    for i in new_range {
                        diff_lines.push(format!("  {:<5}{}", numbers[i], new_content[i]));
                    }
                }
                DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                    for i in old_range {
                        diff_lines.push(
                            style(format!("- {:<5}{}", numbers[i], visible(old_content[i])))
                                .red()
                                .to_string(),
                        );
                    }
                    for i in new_range {
                        diff_lines.push(
                            style(format!("+ {:<5}{}", numbers[i], visible(new_content[i])))
                                .green()
                                .to_string(),
                        );
                    }
                }
            }
        }
        diff_lines.join("\n")
    }
}

/// Makes tabs visible so indentation-only changes can be told apart.
fn visible(line: &str) -> String {
    line.replace('\t', "→   ")
}
