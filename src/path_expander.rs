use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

#[derive(Debug, PartialEq, Eq)]
pub struct ExpansionResult {
    pub files: Vec<String>,
    pub not_found: Vec<String>,
}

/// Expands `paths` into a sorted, deduplicated list of files. Directories are
/// walked recursively, honouring `.gitignore` files and skipping anything
/// matching one of the `ignored` glob patterns. Files named explicitly are
/// always kept.
pub fn expand_and_validate(paths: &[String], ignored: &[String]) -> ExpansionResult {
    let mut files = BTreeSet::new();
    let mut not_found = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_dir() {
            expand_directory(path, ignored, &mut files);
        } else if path.is_file() {
            files.insert(path.to_string_lossy().into_owned());
        } else {
            not_found.push(path_str.clone());
        }
    }

    ExpansionResult {
        files: files.into_iter().collect(),
        not_found,
    }
}

fn expand_directory(dir_path: &Path, ignored: &[String], files: &mut BTreeSet<String>) {
    let mut overrides = OverrideBuilder::new(dir_path);
    for pattern in ignored {
        if let Err(e) = overrides.add(&format!("!{pattern}")) {
            warn!(pattern = %pattern, error = %e, "skipping invalid ignore pattern");
        }
    }

    let mut walker = WalkBuilder::new(dir_path);
    walker.hidden(false).require_git(false);
    match overrides.build() {
        Ok(overrides) => {
            walker.overrides(overrides);
        }
        Err(e) => warn!(error = %e, "ignoring ignore patterns"),
    }

    for entry in walker.build().filter_map(Result::ok) {
        if entry.file_type().is_some_and(|kind| kind.is_file()) {
            files.insert(entry.path().to_string_lossy().into_owned());
        }
    }
}
