use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A naming convention identifiers are normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CasingConvention {
    /// `myVarName`
    Camel,
    /// `MyVarName`
    Pascal,
    /// `my_var_name`
    Snake,
}

impl CasingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasingConvention::Camel => "camel",
            CasingConvention::Pascal => "pascal",
            CasingConvention::Snake => "snake",
        }
    }

    /// Respells `identifier` in this convention. Leading and trailing
    /// underscores are kept as they are. Applying a convention to its own
    /// output returns it unchanged.
    pub fn apply(&self, identifier: &str) -> String {
        let core = identifier.trim_matches('_');
        if core.is_empty() {
            return identifier.to_string();
        }
        let start = identifier.len() - identifier.trim_start_matches('_').len();
        let prefix = &identifier[..start];
        let suffix = &identifier[start + core.len()..];

        let had_underscores = core.contains('_');
        let words = split_words(core);
        let body = match self {
            CasingConvention::Snake => words
                .iter()
                .map(|word| word.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            CasingConvention::Camel => words
                .iter()
                .enumerate()
                .map(|(idx, word)| {
                    if idx == 0 {
                        word.to_lowercase()
                    } else {
                        capitalize(word, had_underscores)
                    }
                })
                .collect(),
            CasingConvention::Pascal => words
                .iter()
                .map(|word| capitalize(word, had_underscores))
                .collect(),
        };
        format!("{prefix}{body}{suffix}")
    }
}

impl fmt::Display for CasingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CasingConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camel" => Ok(CasingConvention::Camel),
            "pascal" => Ok(CasingConvention::Pascal),
            "snake" => Ok(CasingConvention::Snake),
            other => Err(format!("Invalid casing convention provided: {other}")),
        }
    }
}

/// Splits on underscores and on case changes: `fooBar`, `foo2Bar` and the
/// last capital of an acronym followed by lowercase (`HTTPServer`).
fn split_words(core: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for part in core.split('_').filter(|part| !part.is_empty()) {
        let chars: Vec<(usize, char)> = part.char_indices().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let (at, c) = chars[i];
            let prev = chars[i - 1].1;
            let next = chars.get(i + 1).map(|&(_, n)| n);
            let boundary = c.is_uppercase()
                && (prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next.is_some_and(char::is_lowercase)));
            if boundary {
                words.push(&part[start..at]);
                start = at;
            }
        }
        words.push(&part[start..]);
    }
    words
}

/// Uppercases the first character. An all-caps word that came from an
/// underscore-separated identifier (`MAX_SIZE`) is lowercased first.
fn capitalize(word: &str, fold_all_caps: bool) -> String {
    let all_caps = word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase);
    let word = if fold_all_caps && all_caps {
        word.to_lowercase()
    } else {
        word.to_string()
    };
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
