//! Shell-script stand-ins for the external engines.
//!
//! The "video" is a text file with one line per frame. Crop copies it
//! through; frame extraction writes each line to its own numbered file;
//! OCR prints the frame file back.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::shared::crop_area::CropArea;
use crate::shared::endpoint::InputSource;
use crate::shared::sample_rate::SampleRate;
use crate::stage::domain::duration_probe::DurationProbe;
use crate::stage::domain::media_engine::{Endpoint, MediaEngine, StageInvocation};
use crate::stage::domain::ocr_engine::{OcrEngine, OcrMode, OcrOptions};

use super::orchestrator_config::OrchestratorConfig;
use super::pipeline_orchestrator::PipelineOrchestrator;

pub(crate) const COPY: &str = r#"[ -n "$1" ] && printf 'out_time_us=1000000\nprogress=end\n' > "$1"
cat "$2" > "$3""#;

pub(crate) const SPLIT: &str = r#"[ -n "$1" ] && printf 'out_time_ms=2000000\nprogress=end\n' > "$1"
n=0
cat "$2" | while IFS= read -r line; do
  n=$((n+1))
  printf '%s\n' "$line" > "$(printf "$3" "$n")"
done"#;

pub(crate) struct ScriptEngine {
    pub crop: &'static str,
    pub frames: &'static str,
}

impl ScriptEngine {
    pub fn working() -> Self {
        Self {
            crop: COPY,
            frames: SPLIT,
        }
    }
}

fn endpoint(endpoint: Endpoint<'_>, pipe: &str) -> OsString {
    match endpoint {
        Endpoint::Path(path) => path.as_os_str().to_owned(),
        Endpoint::Pipe => pipe.into(),
    }
}

/// `sh -c body stub <feed> <input> <output>`.
fn script(body: &str, invocation: &StageInvocation<'_>) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(body)
        .arg("stub")
        .arg(
            invocation
                .progress
                .map(|p| p.as_os_str().to_owned())
                .unwrap_or_default(),
        )
        .arg(endpoint(invocation.input, "-"))
        .arg(endpoint(invocation.output, "/dev/stdout"));
    command
}

impl MediaEngine for ScriptEngine {
    fn crop(&self, _area: &CropArea, invocation: &StageInvocation<'_>) -> Command {
        script(self.crop, invocation)
    }

    fn extract_frames(&self, _rate: &SampleRate, invocation: &StageInvocation<'_>) -> Command {
        script(self.frames, invocation)
    }
}

pub(crate) struct CatOcr;

impl OcrEngine for CatOcr {
    fn recognize(&self, frame: &Path, _options: &OcrOptions) -> Command {
        let mut command = Command::new("cat");
        command.arg(frame);
        command
    }
}

pub(crate) struct FixedProbe(pub Option<f64>);

impl DurationProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> Option<f64> {
        self.0
    }
}

#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Temp directories for inputs/outputs and for the scratch root.
pub(crate) struct Fixture {
    dir: TempDir,
    scratch: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        }
    }

    pub fn video(&self, lines: &str) -> InputSource {
        let path = self.dir.path().join("clip.mkv");
        fs::write(&path, lines).unwrap();
        InputSource::File(path)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self, progress: bool) -> OrchestratorConfig {
        OrchestratorConfig {
            progress,
            verbose: false,
            scratch_root: Some(self.scratch.path().to_path_buf()),
            handle_signals: false,
            tee: None,
        }
    }

    pub fn orchestrator(
        &self,
        engine: ScriptEngine,
        config: OrchestratorConfig,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Box::new(engine),
            Box::new(CatOcr),
            Box::new(FixedProbe(Some(2.0))),
            config,
        )
    }

    pub fn scratch_is_empty(&self) -> bool {
        fs::read_dir(self.scratch.path()).unwrap().next().is_none()
    }
}

pub(crate) fn area() -> CropArea {
    "600x50+210+498".parse().unwrap()
}

pub(crate) fn rate() -> SampleRate {
    "1".parse().unwrap()
}

pub(crate) fn ocr() -> OcrOptions {
    OcrOptions::new("eng", OcrMode::Accurate).unwrap()
}
