use anyhow::Result;
use clap::Parser;
use linestyle::analysis::{self, Analyzer, FileReport};
use linestyle::cli::{Cli, OutputFormat};
use linestyle::{config, path_expander, ui};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_create()?,
    };
    config.apply(&cli.overrides());
    debug!(?config, "effective configuration");

    let analyzer = Arc::new(Analyzer::new(&config)?);

    let expansion = path_expander::expand_and_validate(&cli.paths, &config.ignored_paths);
    for missing in &expansion.not_found {
        ui::print_warning(&format!("Path not found: {missing}"));
    }

    let mut tasks = JoinSet::new();
    for file in expansion.files {
        let analyzer = Arc::clone(&analyzer);
        let path = PathBuf::from(file);
        tasks.spawn_blocking(move || analyzer.analyze_file(&path));
    }

    let mut reports: Vec<FileReport> = Vec::new();
    let mut failed = false;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                ui::print_error(&e.to_string());
                failed = true;
            }
            Err(e) => {
                ui::print_error(&format!("Analysis task failed: {e}"));
                failed = true;
            }
        }
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));

    let unresolved = if cli.fix {
        let summary = analysis::write_all_fixes(&reports);
        for error in &summary.errors {
            ui::print_error(error);
            failed = true;
        }
        info!(files = summary.fixed_files, "fixes written");
        summary.unresolved
    } else {
        reports.iter().map(|report| report.results.len()).sum()
    };

    match cli.format {
        OutputFormat::Text => ui::print_text(&reports),
        OutputFormat::Json => ui::print_json(&reports)?,
    }

    if failed || unresolved > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
