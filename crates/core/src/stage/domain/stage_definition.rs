use std::path::PathBuf;

use crate::lifecycle::working_area::WorkingAreaPolicy;
use crate::shared::crop_area::CropArea;
use crate::shared::endpoint::{InputSource, OutputSink};
use crate::shared::sample_rate::SampleRate;

use super::exec_template::ExecTemplate;
use super::ocr_engine::OcrOptions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageInput {
    File(PathBuf),
    Stdin,
    /// Output of the previous stage.
    Upstream,
}

impl From<InputSource> for StageInput {
    fn from(source: InputSource) -> Self {
        match source {
            InputSource::Stdin => Self::Stdin,
            InputSource::File(path) => Self::File(path),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutput {
    File(PathBuf),
    Stdout,
    /// Byte stream piped into the next stage.
    Downstream,
    /// One numbered image per frame, in a working area.
    FrameDirectory(WorkingAreaPolicy),
}

impl From<OutputSink> for StageOutput {
    fn from(sink: OutputSink) -> Self {
        match sink {
            OutputSink::Stdout => Self::Stdout,
            OutputSink::File(path) => Self::File(path),
        }
    }
}

/// The command run once per extracted frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameCommand {
    Ocr(OcrOptions),
    Exec(ExecTemplate),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StageKind {
    Crop(CropArea),
    ExtractFrames(SampleRate),
    /// Runs a command per frame in filename order. With `dedup`, the output
    /// lines are reduced into a transcript; otherwise copied verbatim.
    PerFrame { command: FrameCommand, dedup: bool },
}

impl StageKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Crop(_) => "crop",
            Self::ExtractFrames(_) => "frames",
            Self::PerFrame {
                command: FrameCommand::Ocr(_),
                ..
            } => "ocr",
            Self::PerFrame {
                command: FrameCommand::Exec(_),
                ..
            } => "exec",
        }
    }

    /// Streaming stages run as one long-lived process connected by pipes.
    pub fn is_streaming(&self) -> bool {
        !matches!(self, Self::PerFrame { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StageDefinition {
    pub kind: StageKind,
    pub input: StageInput,
    pub output: StageOutput,
}

impl StageDefinition {
    pub fn new(kind: StageKind, input: StageInput, output: StageOutput) -> Self {
        Self {
            kind,
            input,
            output,
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}
