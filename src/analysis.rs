//! # Per-file analysis
//!
//! An `Analyzer` is built once from the configuration and then shared by all
//! workers. Every file is analyzed on its own: it is read, matched to a
//! language, annotated, and run through the configured checks. Nothing one
//! file produces is visible to another.

use crate::annotation::annotate;
use crate::casing::CasingCheck;
use crate::check::{CheckCollection, CheckContext};
use crate::config::Config;
use crate::indent::IndentationCheck;
use crate::language::{LanguageRegistry, LanguageSpec};
use crate::position::SourceFile;
use crate::result::LintResult;
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub struct Analyzer {
    registry: LanguageRegistry,
    forced_language: Option<String>,
    checks: CheckCollection,
}

impl Analyzer {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let registry = LanguageRegistry::load(&config.language_dirs)?;
        if let Some(name) = &config.language {
            if registry.get(name).is_none() {
                return Err(anyhow!(
                    "Unknown language '{}'. Available languages: {}",
                    name,
                    registry.names().join(", ")
                ));
            }
        }
        Ok(Self {
            registry,
            forced_language: config.language.clone(),
            checks: build_checks(config),
        })
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.names()
    }

    fn language_for(&self, path: &Path) -> Option<&LanguageSpec> {
        match &self.forced_language {
            Some(name) => self.registry.get(name),
            None => self.registry.for_path(path),
        }
    }

    /// Reads and analyzes one file. Only I/O failures are errors; problems in
    /// the file itself end up in the report.
    pub fn analyze_file(&self, path: &Path) -> Result<FileReport> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read '{}': {e}", path.display()))?;
        Ok(self.analyze_source(path, &text))
    }

    pub fn analyze_source(&self, path: &Path, text: &str) -> FileReport {
        let started = Instant::now();
        let file = SourceFile::from_text(text);

        let Some(language) = self.language_for(path) else {
            debug!(file = %path.display(), "no language definition, skipping");
            return FileReport {
                path: path.to_path_buf(),
                language: None,
                skipped: Some(format!(
                    "No language definition matches '{}'.",
                    path.display()
                )),
                results: Vec::new(),
                lines: file.lines().to_vec(),
            };
        };

        let annotations = annotate(&file, language);
        let ctx = CheckContext {
            filename: path,
            file: &file,
            annotations: &annotations,
            language,
        };
        let results = self.checks.run_all(&ctx);
        debug!(
            file = %path.display(),
            language = %language.name,
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analyzed file"
        );

        FileReport {
            path: path.to_path_buf(),
            language: Some(language.name.clone()),
            skipped: None,
            results,
            lines: file.lines().to_vec(),
        }
    }
}

/// Builds the configured checks in configuration order. Names are expected
/// to have passed `Config::validate`; unknown names are ignored.
pub fn build_checks(config: &Config) -> CheckCollection {
    let mut checks = CheckCollection::new();
    for name in &config.checks {
        match name.as_str() {
            crate::indent::ORIGIN => checks.register(Box::new(IndentationCheck::new(
                config.use_spaces,
                config.tab_width,
            ))),
            crate::casing::ORIGIN => checks.register(Box::new(CasingCheck::new(&config.casing))),
            _ => {}
        }
    }
    checks
}

/// Everything found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: Option<String>,
    /// Why the file was not analyzed, if it was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub results: Vec<LintResult>,
    #[serde(skip)]
    lines: Vec<String>,
}

/// The outcome of applying a report's fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub lines: Vec<String>,
    pub applied: usize,
    pub skipped: usize,
    /// Results left standing after the fixes: no diff, or a skipped one.
    pub unresolved: usize,
}

/// Totals of writing fixes for a set of files.
#[derive(Debug, Default)]
pub struct FixSummary {
    pub fixed_files: usize,
    pub unresolved: usize,
    pub errors: Vec<String>,
}

/// Writes the fixes of every report. A file that cannot be written is
/// recorded in `errors` and counts all of its results as unresolved; the
/// remaining files are still fixed.
pub fn write_all_fixes(reports: &[FileReport]) -> FixSummary {
    let mut summary = FixSummary::default();
    for report in reports {
        match report.write_fixes() {
            Ok(outcome) => {
                if outcome.applied > 0 {
                    info!(
                        file = %report.path.display(),
                        applied = outcome.applied,
                        skipped = outcome.skipped,
                        "fixed file"
                    );
                    summary.fixed_files += 1;
                }
                summary.unresolved += outcome.unresolved;
            }
            Err(e) => {
                summary.unresolved += report.results.len();
                summary.errors.push(e.to_string());
            }
        }
    }
    summary
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.results.is_empty()
    }

    /// Applies the diffs of all results in order. A diff touching a line
    /// that an earlier diff already changed is skipped as a whole.
    pub fn apply_fixes(&self) -> FixOutcome {
        let mut lines = self.lines.clone();
        let mut changed: BTreeSet<usize> = BTreeSet::new();
        let mut applied = 0;
        let mut skipped = 0;
        for diff in self.results.iter().filter_map(|result| result.diffs.get(&self.path)) {
            if diff.is_empty() {
                continue;
            }
            if diff.lines().any(|line| changed.contains(&line)) {
                debug!(file = %self.path.display(), first_line = ?diff.first_line(), "overlapping fix skipped");
                skipped += 1;
                continue;
            }
            lines = diff.apply(&lines);
            changed.extend(diff.lines());
            applied += 1;
        }
        FixOutcome {
            lines,
            applied,
            skipped,
            unresolved: self.results.len() - applied,
        }
    }

    /// Writes the fixed file back to disk when at least one fix applies.
    pub fn write_fixes(&self) -> Result<FixOutcome> {
        let outcome = self.apply_fixes();
        if outcome.applied > 0 {
            fs::write(&self.path, outcome.lines.concat())
                .map_err(|e| anyhow!("Could not write '{}': {e}", self.path.display()))?;
        }
        Ok(outcome)
    }
}
