pub mod analysis;
pub mod annotation;
pub mod blocks;
pub mod casing;
pub mod check;
pub mod cli;
pub mod config;
pub mod diff;
pub mod indent;
pub mod language;
pub mod path_expander;
pub mod position;
pub mod result;
pub mod sequence;
pub mod ui;

pub use analysis::{Analyzer, FileReport};
pub use check::{Check, CheckCollection};
pub use config::Config;
