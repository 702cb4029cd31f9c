use crate::casing::CasingConvention;
use crate::config::Overrides;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Checks indentation and identifier casing of source files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to check
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Treat every file as this language instead of guessing from its extension
    #[arg(long)]
    pub language: Option<String>,

    /// Naming convention identifiers should follow
    #[arg(long, value_enum)]
    pub casing: Option<CasingConvention>,

    /// Spaces per indentation level
    #[arg(long)]
    pub tab_width: Option<usize>,

    /// Indent with tabs instead of spaces
    #[arg(long)]
    pub use_tabs: bool,

    /// Checks to run, comma separated (indentation, casing)
    #[arg(long, value_delimiter = ',')]
    pub checks: Option<Vec<String>>,

    /// Apply suggested fixes to the files
    #[arg(long)]
    pub fix: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Read configuration from this file instead of the user config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            casing: self.casing,
            tab_width: self.tab_width,
            use_tabs: self.use_tabs,
            language: self.language.clone(),
            checks: self.checks.clone(),
        }
    }
}
