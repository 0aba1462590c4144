use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::shared::constants::FFPROBE_BINARY;
use crate::stage::domain::duration_probe::DurationProbe;

#[derive(Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn banner_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("duration pattern is valid")
    })
}

/// [`DurationProbe`] backed by `ffprobe`.
///
/// Asks for the container duration as JSON first; if that yields nothing
/// usable, falls back to the `Duration:` line of the human-readable banner.
#[derive(Clone, Debug)]
pub struct FfprobeDurationProbe {
    binary: OsString,
}

impl FfprobeDurationProbe {
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn structured(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.binary)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| log::debug!("ffprobe failed to start: {e}"))
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_json_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn banner(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.binary)
            .arg("-hide_banner")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .output()
            .ok()?;
        parse_banner_duration(&String::from_utf8_lossy(&output.stderr))
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new(FFPROBE_BINARY)
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn probe(&self, path: &Path) -> Option<f64> {
        let duration = self.structured(path).or_else(|| self.banner(path));
        match duration {
            Some(seconds) => log::debug!("Probed duration of {}: {seconds}s", path.display()),
            None => log::warn!(
                "Could not determine the duration of {}; progress will be approximate",
                path.display()
            ),
        }
        duration
    }
}

fn usable(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Extracts `format.duration` from `ffprobe -of json` output.
pub fn parse_json_duration(json: &str) -> Option<f64> {
    let parsed: ProbeOutput = serde_json::from_str(json).ok()?;
    let text = parsed.format?.duration?;
    usable(text.trim().parse().ok()?)
}

/// Extracts `Duration: HH:MM:SS.ss` from the free-text banner.
pub fn parse_banner_duration(text: &str) -> Option<f64> {
    let caps = banner_pattern().captures(text)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    usable(hours * 3600.0 + minutes * 60.0 + seconds)
}
