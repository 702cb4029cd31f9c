use crate::diff::Diff;
use crate::position::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Normal,
    Major,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Normal => "normal",
            Severity::Major => "major",
        };
        f.write_str(label)
    }
}

/// One finding of a check, optionally carrying the fix as per-file diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintResult {
    /// Name of the check that produced the result.
    pub origin: String,
    pub severity: Severity,
    pub message: String,
    pub affected: Option<Range>,
    pub diffs: BTreeMap<PathBuf, Diff>,
}

impl LintResult {
    pub fn new(origin: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            severity,
            message: message.into(),
            affected: None,
            diffs: BTreeMap::new(),
        }
    }

    pub fn with_affected(mut self, range: Range) -> Self {
        self.affected = Some(range);
        self
    }

    pub fn with_diff(mut self, filename: impl Into<PathBuf>, diff: Diff) -> Self {
        self.diffs.insert(filename.into(), diff);
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.diffs.values().any(|diff| !diff.is_empty())
    }
}
