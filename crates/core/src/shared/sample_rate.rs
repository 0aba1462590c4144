use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::config_error::ConfigError;

/// Frames sampled per second of video. Always positive.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleRate {
    text: String,
    value: f64,
}

fn rate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+\.?\d*|\.\d+)$").expect("rate pattern is valid"))
}

impl SampleRate {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Filter expression understood by the media engine. Uses the text as
    /// typed so the engine sees exactly what the user asked for.
    pub fn to_filter(&self) -> String {
        format!("fps={}", self.text)
    }
}

impl FromStr for SampleRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRate(s.to_string());
        if !rate_pattern().is_match(s) {
            return Err(invalid());
        }
        let value: f64 = s.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid());
        }
        Ok(Self {
            text: s.to_string(),
            value,
        })
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
