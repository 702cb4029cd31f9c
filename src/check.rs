//! # Checks
//!
//! A `Check` is one self-contained analysis over a single file. The
//! `CheckCollection` keeps the registered checks in order and runs them,
//! turning any check failure into a single reported result so that a broken
//! file never takes other checks or files down with it.

use crate::annotation::AnnotationSet;
use crate::blocks::StructureError;
use crate::language::LanguageSpec;
use crate::position::SourceFile;
use crate::result::{LintResult, Severity};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Everything a check may read about the file under analysis.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub filename: &'a Path,
    pub file: &'a SourceFile,
    pub annotations: &'a AnnotationSet,
    pub language: &'a LanguageSpec,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("{0}")]
    Configuration(String),
    #[error("Failed to build pattern: {0}")]
    Pattern(#[from] fancy_regex::Error),
}

impl CheckError {
    pub fn severity(&self) -> Severity {
        match self {
            CheckError::Structure(_) => Severity::Major,
            CheckError::Configuration(_) | CheckError::Pattern(_) => Severity::Normal,
        }
    }
}

/// A trait representing a self-contained analysis of one file.
///
/// Object-safe so checks can be stored as `Box<dyn Check>`, and `Send + Sync`
/// so a collection can be shared by workers analyzing different files.
pub trait Check: Send + Sync {
    /// Returns the unique, static name of the check.
    fn name(&self) -> &'static str;

    /// Runs the check. An `Err` aborts this check for this file only.
    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<LintResult>, CheckError>;
}

/// An ordered registry of checks.
#[derive(Default)]
pub struct CheckCollection {
    checks: Vec<Box<dyn Check>>,
}

impl CheckCollection {
    /// Creates a new, empty `CheckCollection`.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Registers a check. A check with the same name replaces the old one in place.
    pub fn register(&mut self, check: Box<dyn Check>) {
        match self.checks.iter_mut().find(|c| c.name() == check.name()) {
            Some(slot) => *slot = check,
            None => self.checks.push(check),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every check in registration order.
    ///
    /// This always succeeds from the caller's perspective: a failing check
    /// contributes exactly one result describing the failure.
    pub fn run_all(&self, ctx: &CheckContext<'_>) -> Vec<LintResult> {
        let mut results = Vec::new();
        for check in &self.checks {
            match check.run(ctx) {
                Ok(found) => {
                    debug!(
                        check = check.name(),
                        file = %ctx.filename.display(),
                        results = found.len(),
                        "check finished"
                    );
                    results.extend(found);
                }
                Err(e) => {
                    info!(
                        check = check.name(),
                        file = %ctx.filename.display(),
                        error = %e,
                        "check failed"
                    );
                    results.push(LintResult::new(check.name(), e.severity(), e.to_string()));
                }
            }
        }
        results
    }
}
