use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use crate::shared::constants::{FFMPEG_BINARY, FFPROBE_BINARY, TESSERACT_BINARY};
use crate::stage::infrastructure::ffmpeg_engine::FfmpegEngine;
use crate::stage::infrastructure::ffprobe_duration_probe::FfprobeDurationProbe;
use crate::stage::infrastructure::tesseract_engine::TesseractEngine;

/// Runtime settings for one orchestrator.
pub struct OrchestratorConfig {
    /// Draw progress bars on stderr. Ignored when `verbose`.
    pub progress: bool,
    /// Pass engine diagnostics straight through instead of drawing progress.
    pub verbose: bool,
    /// Parent directory for the scratch area; system temp dir when `None`.
    pub scratch_root: Option<PathBuf>,
    /// Install SIGINT/SIGTERM/SIGHUP handling for the duration of a run.
    pub handle_signals: bool,
    /// Copy every transcript line to this writer as it is produced.
    pub tee: Option<Box<dyn Write + Send>>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress: true,
            verbose: false,
            scratch_root: None,
            handle_signals: true,
            tee: None,
        }
    }
}

impl OrchestratorConfig {
    pub(crate) fn shows_progress(&self) -> bool {
        self.progress && !self.verbose
    }
}

/// Locations of the external engine binaries.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub ffmpeg: OsString,
    pub ffprobe: OsString,
    pub tesseract: OsString,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: FFMPEG_BINARY.into(),
            ffprobe: FFPROBE_BINARY.into(),
            tesseract: TESSERACT_BINARY.into(),
        }
    }
}

impl EngineConfig {
    pub fn media_engine(&self) -> FfmpegEngine {
        FfmpegEngine::new(self.ffmpeg.clone())
    }

    pub fn duration_probe(&self) -> FfprobeDurationProbe {
        FfprobeDurationProbe::new(self.ffprobe.clone())
    }

    pub fn ocr_engine(&self) -> TesseractEngine {
        TesseractEngine::new(self.tesseract.clone())
    }
}
