use std::ffi::OsString;

use clap::Args;

use subscan_core::pipeline::orchestrator_config::{EngineConfig, OrchestratorConfig};
use subscan_core::shared::constants::{FFMPEG_BINARY, FFPROBE_BINARY, TESSERACT_BINARY};

/// Locations of the external engines.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// ffmpeg binary used for cropping and frame extraction.
    #[arg(long, env = "SUBSCAN_FFMPEG", default_value = FFMPEG_BINARY)]
    pub ffmpeg: OsString,

    /// ffprobe binary used to read the input duration.
    #[arg(long, env = "SUBSCAN_FFPROBE", default_value = FFPROBE_BINARY)]
    pub ffprobe: OsString,

    /// tesseract binary used for OCR.
    #[arg(long, env = "SUBSCAN_TESSERACT", default_value = TESSERACT_BINARY)]
    pub tesseract: OsString,
}

impl EngineArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            tesseract: self.tesseract.clone(),
        }
    }
}

/// How the run reports on stderr.
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Show engine diagnostics and debug logs instead of progress bars.
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not draw progress bars.
    #[arg(long)]
    pub no_progress: bool,
}

impl DisplayArgs {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            progress: !self.no_progress,
            verbose: self.verbose,
            ..OrchestratorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        engines: EngineArgs,
        #[command(flatten)]
        display: DisplayArgs,
    }

    #[test]
    fn test_engine_flag_overrides_default() {
        let cli = TestCli::try_parse_from(["test", "--ffmpeg", "/opt/ffmpeg"]).unwrap();
        let config = cli.engines.engine_config();
        assert_eq!(config.ffmpeg, "/opt/ffmpeg");
        assert!(!config.tesseract.is_empty());
    }

    #[test]
    fn test_verbose_disables_progress() {
        let cli = TestCli::try_parse_from(["test", "-v"]).unwrap();
        let config = cli.display.orchestrator_config();
        assert!(config.verbose);
        assert!(config.handle_signals);
        assert!(cli.display.verbose);
    }

    #[test]
    fn test_no_progress() {
        let cli = TestCli::try_parse_from(["test", "--no-progress"]).unwrap();
        assert!(!cli.display.orchestrator_config().progress);
    }
}
