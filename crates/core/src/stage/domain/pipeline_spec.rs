use crate::lifecycle::working_area::WorkingAreaPolicy;
use crate::shared::config_error::ConfigError;
use crate::shared::crop_area::CropArea;
use crate::shared::endpoint::{InputSource, OutputSink};
use crate::shared::sample_rate::SampleRate;

use super::ocr_engine::OcrOptions;
use super::stage_definition::{FrameCommand, StageDefinition, StageInput, StageKind, StageOutput};

/// An ordered, validated chain of stages. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSpec {
    stages: Vec<StageDefinition>,
}

impl PipelineSpec {
    /// Validates how the stages connect. File existence is checked
    /// separately by [`PipelineSpec::validate_inputs`].
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::InvalidPipeline(msg.to_string()));

        let Some(first) = stages.first() else {
            return invalid("no stages");
        };
        if first.input == StageInput::Upstream {
            return invalid("the first stage has no upstream to read from");
        }

        for (index, stage) in stages.iter().enumerate() {
            let is_last = index + 1 == stages.len();
            match (&stage.kind, &stage.output) {
                (StageKind::Crop(_), StageOutput::FrameDirectory(_)) => {
                    return invalid("crop writes a byte stream, not frames");
                }
                (StageKind::ExtractFrames(_), StageOutput::FrameDirectory(_)) => {}
                (StageKind::ExtractFrames(_), _) => {
                    return invalid("frame extraction must write to a frame directory");
                }
                (StageKind::PerFrame { .. }, StageOutput::File(_) | StageOutput::Stdout) => {}
                (StageKind::PerFrame { .. }, _) => {
                    return invalid("per-frame output must be a file or stdout");
                }
                _ => {}
            }
            let feeds_next = matches!(
                stage.output,
                StageOutput::Downstream | StageOutput::FrameDirectory(_)
            );
            if is_last && stage.output == StageOutput::Downstream {
                return invalid("the last stage cannot write downstream");
            }
            if !is_last && !feeds_next {
                return invalid("a stage followed by another must feed it");
            }

            if index == 0 {
                if !stage.kind.is_streaming() {
                    return invalid("a per-frame command needs frames from an earlier stage");
                }
                continue;
            }
            let previous = &stages[index - 1];
            if stage.input != StageInput::Upstream {
                return invalid("only the first stage may read a file or stdin");
            }
            match (&previous.output, &stage.kind) {
                (StageOutput::Downstream, kind) if kind.is_streaming() => {}
                (StageOutput::FrameDirectory(_), StageKind::PerFrame { .. }) => {}
                (StageOutput::Downstream, _) => {
                    return invalid("a byte stream can only feed crop or frame extraction");
                }
                _ => return invalid("a frame directory can only feed a per-frame command"),
            }
        }

        Ok(Self { stages })
    }

    /// Crops a video to a file or stdout.
    pub fn crop(
        input: InputSource,
        area: CropArea,
        output: OutputSink,
    ) -> Result<Self, ConfigError> {
        Self::new(vec![StageDefinition::new(
            StageKind::Crop(area),
            input.into(),
            output.into(),
        )])
    }

    /// Samples frames into a working area, optionally running a command on
    /// every frame and writing its raw output to `output`.
    pub fn extract_frames(
        input: InputSource,
        rate: SampleRate,
        area: WorkingAreaPolicy,
        per_frame: Option<(FrameCommand, OutputSink)>,
    ) -> Result<Self, ConfigError> {
        let mut stages = vec![StageDefinition::new(
            StageKind::ExtractFrames(rate),
            input.into(),
            StageOutput::FrameDirectory(area),
        )];
        if let Some((command, output)) = per_frame {
            stages.push(StageDefinition::new(
                StageKind::PerFrame {
                    command,
                    dedup: false,
                },
                StageInput::Upstream,
                output.into(),
            ));
        }
        Self::new(stages)
    }

    /// Full subtitle scan: crop → frames (ephemeral) → OCR → transcript.
    pub fn scan(
        input: InputSource,
        area: CropArea,
        rate: SampleRate,
        ocr: OcrOptions,
        output: OutputSink,
    ) -> Result<Self, ConfigError> {
        Self::new(vec![
            StageDefinition::new(StageKind::Crop(area), input.into(), StageOutput::Downstream),
            StageDefinition::new(
                StageKind::ExtractFrames(rate),
                StageInput::Upstream,
                StageOutput::FrameDirectory(WorkingAreaPolicy::Ephemeral),
            ),
            StageDefinition::new(
                StageKind::PerFrame {
                    command: FrameCommand::Ocr(ocr),
                    dedup: true,
                },
                StageInput::Upstream,
                output.into(),
            ),
        ])
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Input of the first stage.
    pub fn source(&self) -> &StageInput {
        &self.stages[0].input
    }

    /// The leading stages that run concurrently as connected processes.
    pub fn streaming_stages(&self) -> &[StageDefinition] {
        let count = self
            .stages
            .iter()
            .take_while(|s| s.kind.is_streaming())
            .count();
        &self.stages[..count]
    }

    pub fn per_frame_stage(&self) -> Option<&StageDefinition> {
        self.stages
            .iter()
            .find(|s| matches!(s.kind, StageKind::PerFrame { .. }))
    }

    pub fn frame_directory(&self) -> Option<&WorkingAreaPolicy> {
        self.stages.iter().find_map(|s| match &s.output {
            StageOutput::FrameDirectory(policy) => Some(policy),
            _ => None,
        })
    }

    /// Final output endpoint of the pipeline.
    pub fn output(&self) -> &StageOutput {
        &self.stages[self.stages.len() - 1].output
    }

    /// Checks that input files exist. Runs before any resource is created.
    pub fn validate_inputs(&self) -> Result<(), ConfigError> {
        match self.source() {
            StageInput::File(path) => InputSource::File(path.clone()).validate(),
            _ => Ok(()),
        }
    }
}
