use crate::analysis::FileReport;
use crate::result::{LintResult, Severity};
use anyhow::Result;
use console::style;

/// Human-readable listing of one file's results.
pub fn format_report(report: &FileReport) -> String {
    let mut out = Vec::new();
    if let Some(reason) = &report.skipped {
        out.push(style(format!("{}: {reason}", report.path.display())).dim().to_string());
        return out.join("\n");
    }
    for result in &report.results {
        out.push(format_result(report, result));
    }
    out.join("\n")
}

fn format_result(report: &FileReport, result: &LintResult) -> String {
    let location = match result.affected {
        Some(range) => format!("{}:{}", report.path.display(), range.start),
        None => report.path.display().to_string(),
    };
    let severity = match result.severity {
        Severity::Info => style(result.severity.to_string()).cyan(),
        Severity::Normal => style(result.severity.to_string()).yellow(),
        Severity::Major => style(result.severity.to_string()).red().bold(),
    };
    let mut lines = vec![format!(
        "{} [{}] {}: {}",
        style(location).bold(),
        severity,
        style(&result.origin).magenta(),
        result.message
    )];
    if let Some(diff) = result.diffs.get(&report.path) {
        lines.push(diff.render());
    }
    lines.join("\n")
}

pub fn print_text(reports: &[FileReport]) {
    let mut issues = 0;
    let mut files_with_issues = 0;
    for report in reports {
        let text = format_report(report);
        if !text.is_empty() {
            println!("{text}");
        }
        if !report.results.is_empty() {
            issues += report.results.len();
            files_with_issues += 1;
        }
    }
    let summary = format!(
        "{issues} issue(s) in {files_with_issues} of {} file(s)",
        reports.len()
    );
    if issues == 0 {
        println!("{}", style(summary).green());
    } else {
        println!("{}", style(summary).yellow());
    }
}

pub fn print_json(reports: &[FileReport]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

pub fn print_warning(message: &str) {
    eprintln!("{}", style(message).yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{}", style(message).red());
}
