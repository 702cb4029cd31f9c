use crate::casing::CasingConvention;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const KNOWN_CHECKS: [&str; 2] = ["indentation", "casing"];

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// One of `camel`, `pascal` or `snake`.
    pub casing: String,
    pub use_spaces: bool,
    pub tab_width: usize,
    /// Checks to run, in order.
    pub checks: Vec<String>,
    /// Forces a language instead of choosing one by file extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Extra directories holding `<name>.toml` language definitions.
    pub language_dirs: Vec<String>,
    /// Glob patterns skipped when expanding directories.
    pub ignored_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            casing: CasingConvention::Snake.to_string(),
            use_spaces: true,
            tab_width: 4,
            checks: KNOWN_CHECKS.iter().map(|check| check.to_string()).collect(),
            language: None,
            language_dirs: Vec::new(),
            ignored_paths: vec![".git".to_string()],
        }
    }
}

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub casing: Option<CasingConvention>,
    pub tab_width: Option<usize>,
    pub use_tabs: bool,
    pub language: Option<String>,
    pub checks: Option<Vec<String>>,
}

impl Config {
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(casing) = overrides.casing {
            self.casing = casing.to_string();
        }
        if let Some(tab_width) = overrides.tab_width {
            self.tab_width = tab_width;
        }
        if overrides.use_tabs {
            self.use_spaces = false;
        }
        if let Some(language) = &overrides.language {
            self.language = Some(language.clone());
        }
        if let Some(checks) = &overrides.checks {
            self.checks = checks.clone();
        }
    }

    /// Rejects values no file could be analyzed with. An unknown casing
    /// convention is left for the casing check to report.
    pub fn validate(&self) -> Result<()> {
        if self.tab_width == 0 {
            return Err(anyhow!("tab_width must be at least 1."));
        }
        if let Some(unknown) = self
            .checks
            .iter()
            .find(|check| !KNOWN_CHECKS.contains(&check.as_str()))
        {
            return Err(anyhow!(
                "Unknown check '{}'. Available checks: {}",
                unknown,
                KNOWN_CHECKS.join(", ")
            ));
        }
        Ok(())
    }

    /// Replaces empty or zero values with their defaults.
    fn with_defaults(self) -> Self {
        let default_config = Config::default();
        Config {
            casing: if self.casing.is_empty() {
                default_config.casing
            } else {
                self.casing
            },
            use_spaces: self.use_spaces,
            tab_width: if self.tab_width == 0 {
                default_config.tab_width
            } else {
                self.tab_width
            },
            checks: if self.checks.is_empty() {
                default_config.checks
            } else {
                self.checks
            },
            language: self.language.filter(|language| !language.is_empty()),
            language_dirs: self.language_dirs,
            ignored_paths: self.ignored_paths,
        }
    }
}

/// Loads the user configuration from `$XDG_CONFIG_HOME/linestyle/config.toml`,
/// creating it on first use.
pub fn load_or_create() -> Result<Config> {
    let xdg_dirs = xdg::BaseDirectories::new();
    let config_path = xdg_dirs.place_config_file("linestyle/config.toml")?;
    load_or_create_at(&config_path)
}

pub fn load_or_create_at(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        let default_config = Config::default();
        let toml_string = toml::to_string_pretty(&default_config)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, toml_string)?;

        eprintln!("Created default config at: {}", config_path.display());
        return Ok(default_config);
    }

    let config_string = fs::read_to_string(config_path)?;
    let final_config = parse(&config_string, config_path)?;

    // Writing the completed config back shows users every available option.
    let final_toml_string = toml::to_string_pretty(&final_config)?;
    if final_toml_string != config_string {
        fs::write(config_path, final_toml_string)?;
    }

    Ok(final_config)
}

/// Loads an explicitly named configuration file. The file is never created
/// or rewritten.
pub fn load_from_path(config_path: &Path) -> Result<Config> {
    let config_string = fs::read_to_string(config_path)
        .map_err(|e| anyhow!("Could not read config '{}': {e}", config_path.display()))?;
    parse(&config_string, config_path)
}

fn parse(config_string: &str, config_path: &Path) -> Result<Config> {
    let config: Config = toml::from_str(config_string)
        .map_err(|e| anyhow!("Invalid config '{}': {e}", config_path.display()))?;
    Ok(config.with_defaults())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::Builder;

    #[test]
    fn test_creates_default_config_on_first_use() {
        let dir = Builder::new().prefix("test-config").tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let config = load_or_create_at(&path).unwrap();
        assert_eq!(config, Config::default());
        let written: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Config::default());
    }

    #[test]
    fn test_fills_missing_fields_and_writes_back() {
        let dir = Builder::new().prefix("test-config").tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "casing = \"camel\"\ntab_width = 0\n").unwrap();

        let config = load_or_create_at(&path).unwrap();
        assert_eq!(config.casing, "camel");
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.checks, vec!["indentation", "casing"]);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("use_spaces = true"));
        assert!(rewritten.contains("tab_width = 4"));
    }

    #[test]
    fn test_load_from_path_does_not_rewrite() {
        let dir = Builder::new().prefix("test-config").tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "use_spaces = false\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert!(!config.use_spaces);
        assert_eq!(fs::read_to_string(&path).unwrap(), "use_spaces = false\n");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let err = load_from_path(Path::new("/no/such/linestyle.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read config"));
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let dir = Builder::new().prefix("test-config").tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "tab_width = \"wide\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        config.apply(&Overrides {
            casing: Some(CasingConvention::Pascal),
            tab_width: Some(2),
            use_tabs: true,
            language: Some("c".to_string()),
            checks: Some(vec!["casing".to_string()]),
        });
        assert_eq!(config.casing, "pascal");
        assert_eq!(config.tab_width, 2);
        assert!(!config.use_spaces);
        assert_eq!(config.language.as_deref(), Some("c"));
        assert_eq!(config.checks, vec!["casing"]);
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let zero_width = Config {
            tab_width: 0,
            ..Config::default()
        };
        assert!(zero_width.validate().is_err());

        let unknown = Config {
            checks: vec!["spelling".to_string()],
            ..Config::default()
        };
        assert_eq!(
            unknown.validate().unwrap_err().to_string(),
            "Unknown check 'spelling'. Available checks: indentation, casing"
        );
    }
}
