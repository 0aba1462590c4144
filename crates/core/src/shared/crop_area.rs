use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::config_error::ConfigError;

/// Rectangle cut out of every frame, written as `WxH+X+Y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropArea {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

fn area_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)x(\d+)\+(\d+)\+(\d+)$").expect("crop area pattern is valid")
    })
}

impl CropArea {
    /// Filter expression understood by the media engine.
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropArea {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidArea(s.to_string());
        let caps = area_pattern().captures(s).ok_or_else(invalid)?;
        let field = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());
        Ok(Self {
            width: field(1)?,
            height: field(2)?,
            x: field(3)?,
            y: field(4)?,
        })
    }
}

impl fmt::Display for CropArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
