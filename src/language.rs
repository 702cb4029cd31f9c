//! # Language Definitions
//!
//! A `LanguageSpec` carries the handful of lexical facts the engine needs
//! about a language: keywords, delimiter characters, which tokens open (and
//! optionally close) an indentation block, encapsulator pairs, and comment and
//! string delimiters. Definitions are TOML files; `python` and `c` ship
//! embedded in the binary and user directories can add or override them.

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN_DEFINITIONS: &[&str] = &[
    include_str!("../languages/python.toml"),
    include_str!("../languages/c.toml"),
];

static BUILTINS: Lazy<Vec<LanguageSpec>> = Lazy::new(|| {
    BUILTIN_DEFINITIONS
        .iter()
        .filter_map(|source| match LanguageSpec::from_toml_str(source) {
            Ok(spec) => Some(spec),
            Err(e) => {
                warn!(error = %e, "skipping invalid built-in language definition");
                None
            }
        })
        .collect()
});

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageSpec {
    pub name: String,
    /// File extensions (without the dot) this definition applies to.
    pub extensions: Vec<String>,
    pub keywords: Option<Vec<String>>,
    pub special_chars: Option<String>,
    /// Indent-open token -> indent-close token. An empty close token means
    /// the block end is inferred from de-indentation.
    pub indent_types: BTreeMap<String, String>,
    pub encapsulators: BTreeMap<String, String>,
    /// Single-line comment openers.
    pub comment_delimiters: Vec<String>,
    pub multiline_comment_delimiters: BTreeMap<String, String>,
    pub string_delimiters: BTreeMap<String, String>,
    pub multiline_string_delimiters: BTreeMap<String, String>,
}

impl LanguageSpec {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let spec: LanguageSpec = toml::from_str(source)?;
        if spec.name.is_empty() {
            return Err(anyhow!("Language definition is missing a `name`."));
        }
        Ok(spec)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read language definition '{}': {e}", path.display()))?;
        Self::from_toml_str(&source)
            .map_err(|e| anyhow!("Invalid language definition '{}': {e}", path.display()))
    }

    /// Non-empty close tokens of all indent types, e.g. `}` for brace languages.
    pub fn closing_tokens(&self) -> Vec<&str> {
        self.indent_types
            .values()
            .map(String::as_str)
            .filter(|close| !close.is_empty())
            .collect()
    }

    /// Every token that starts a comment, single- or multi-line.
    pub fn comment_openers(&self) -> Vec<&str> {
        self.comment_delimiters
            .iter()
            .map(String::as_str)
            .chain(self.multiline_comment_delimiters.keys().map(String::as_str))
            .filter(|open| !open.is_empty())
            .collect()
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
    }
}

/// All known language definitions, keyed by name.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: BTreeMap<String, LanguageSpec>,
}

impl LanguageRegistry {
    /// Creates a registry holding only the built-in definitions.
    pub fn builtin() -> Self {
        let languages = BUILTINS
            .iter()
            .map(|spec| (spec.name.to_lowercase(), spec.clone()))
            .collect();
        Self { languages }
    }

    /// Built-in definitions plus every `*.toml` file found in `dirs`. A user
    /// definition replaces a built-in one of the same name.
    pub fn load(dirs: &[String]) -> Result<Self> {
        let mut registry = Self::builtin();
        for dir in dirs {
            let dir = Path::new(dir);
            if !dir.is_dir() {
                return Err(anyhow!(
                    "Language directory '{}' does not exist or is not a directory.",
                    dir.display()
                ));
            }
            let mut entries: Vec<_> = fs::read_dir(dir)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
                .collect();
            entries.sort();
            for path in entries {
                let spec = LanguageSpec::load_file(&path)?;
                debug!(language = %spec.name, path = %path.display(), "loaded language definition");
                registry.insert(spec);
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, spec: LanguageSpec) {
        self.languages.insert(spec.name.to_lowercase(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&LanguageSpec> {
        self.languages.get(&name.to_lowercase())
    }

    pub fn for_path(&self, path: &Path) -> Option<&LanguageSpec> {
        self.languages
            .values()
            .find(|spec| spec.matches_extension(path))
    }

    pub fn names(&self) -> Vec<&str> {
        self.languages.keys().map(String::as_str).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::Builder;

    #[test]
    fn test_builtin_definitions_parse() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(BUILTINS.len(), BUILTIN_DEFINITIONS.len());
        assert_eq!(registry.names(), vec!["c", "python"]);

        let python = registry.get("Python").unwrap();
        assert_eq!(python.indent_types.get(":"), Some(&String::new()));
        assert!(python.closing_tokens().is_empty());
        assert_eq!(python.comment_openers(), vec!["#"]);
        assert!(python.keywords.as_ref().unwrap().contains(&"def".to_string()));

        let c = registry.get("c").unwrap();
        assert_eq!(c.closing_tokens(), vec!["}"]);
        assert_eq!(c.comment_openers(), vec!["//", "/*"]);
    }

    #[test]
    fn test_language_for_path() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.for_path(Path::new("src/app.py")).unwrap().name, "python");
        assert_eq!(registry.for_path(Path::new("main.C")).unwrap().name, "c");
        assert!(registry.for_path(Path::new("README.md")).is_none());
        assert!(registry.for_path(Path::new("Makefile")).is_none());
        assert!(registry.for_path(Path::new("Main.java")).is_none());
    }

    #[test]
    fn test_missing_optional_fields_are_none() {
        let spec = LanguageSpec::from_toml_str("name = \"plain\"\n").unwrap();
        assert!(spec.keywords.is_none());
        assert!(spec.special_chars.is_none());
        assert!(spec.indent_types.is_empty());
    }

    #[test]
    fn test_definition_without_name_is_rejected() {
        let result = LanguageSpec::from_toml_str("extensions = [\"x\"]\n");
        assert!(result.unwrap_err().to_string().contains("missing a `name`"));
    }

    #[test]
    fn test_user_directory_overrides_builtin() {
        let tmp_dir = Builder::new().prefix("test-lang-").tempdir().unwrap();
        fs::write(
            tmp_dir.path().join("python.toml"),
            "name = \"python\"\nextensions = [\"pyx\"]\n[indent_types]\n\":\" = \"\"\n",
        )
        .unwrap();
        fs::write(tmp_dir.path().join("notes.txt"), "ignored").unwrap();

        let dirs = vec![tmp_dir.path().to_str().unwrap().to_string()];
        let registry = LanguageRegistry::load(&dirs).unwrap();
        let python = registry.get("python").unwrap();
        assert_eq!(python.extensions, vec!["pyx".to_string()]);
        assert!(python.keywords.is_none());
        assert!(registry.get("c").is_some());
    }

    #[test]
    fn test_missing_language_directory_is_an_error() {
        let dirs = vec!["/no/such/linestyle/dir".to_string()];
        let result = LanguageRegistry::load(&dirs);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }
}
