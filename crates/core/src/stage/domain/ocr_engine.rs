use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::shared::config_error::ConfigError;

/// Trade-off between recognition speed and layout analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OcrMode {
    /// Treat each frame as a single line of text.
    Fast,
    /// Let the engine segment a uniform block of text.
    #[default]
    Accurate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OcrOptions {
    languages: Vec<String>,
    mode: OcrMode,
}

fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_/-]+$").expect("language pattern is valid"))
}

impl OcrOptions {
    /// Parses a language list such as `eng`, `eng+jpn` or `eng,chi_sim`.
    pub fn new(languages: &str, mode: OcrMode) -> Result<Self, ConfigError> {
        let parsed: Vec<String> = languages
            .split(['+', ','])
            .map(str::trim)
            .map(str::to_string)
            .collect();
        if parsed.iter().any(|l| !language_pattern().is_match(l)) {
            return Err(ConfigError::InvalidLanguages(languages.to_string()));
        }
        Ok(Self {
            languages: parsed,
            mode,
        })
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn mode(&self) -> OcrMode {
        self.mode
    }

    /// Language list in the `a+b` form the OCR engine expects.
    pub fn language_arg(&self) -> String {
        self.languages.join("+")
    }
}

/// Builds the per-frame recognition command. The command must write the
/// recognized lines, top to bottom, to its stdout.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, frame: &Path, options: &OcrOptions) -> Command;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single("eng", &["eng"])]
    #[case::plus("eng+jpn", &["eng", "jpn"])]
    #[case::comma("eng, chi_sim", &["eng", "chi_sim"])]
    #[case::script("script/Latin", &["script/Latin"])]
    fn test_parses_language_lists(#[case] input: &str, #[case] expected: &[&str]) {
        let options = OcrOptions::new(input, OcrMode::Fast).unwrap();
        assert_eq!(options.languages(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::trailing_separator("eng+")]
    #[case::shell_metachar("eng;rm")]
    #[case::space_inside("en g")]
    fn test_rejects_bad_language_lists(#[case] input: &str) {
        assert!(matches!(
            OcrOptions::new(input, OcrMode::Accurate),
            Err(ConfigError::InvalidLanguages(_))
        ));
    }

    #[test]
    fn test_language_arg_joins_with_plus() {
        let options = OcrOptions::new("eng,jpn", OcrMode::Accurate).unwrap();
        assert_eq!(options.language_arg(), "eng+jpn");
        assert_eq!(options.mode(), OcrMode::Accurate);
    }
}
