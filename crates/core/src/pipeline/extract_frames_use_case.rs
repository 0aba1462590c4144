use crate::lifecycle::working_area::WorkingAreaPolicy;
use crate::shared::endpoint::{InputSource, OutputSink};
use crate::shared::sample_rate::SampleRate;
use crate::stage::domain::pipeline_spec::PipelineSpec;
use crate::stage::domain::stage_definition::FrameCommand;

use super::interrupt_listener::CancelHandle;
use super::pipeline_error::PipelineError;
use super::pipeline_orchestrator::{PipelineOrchestrator, RunReport};

/// Samples frames from a video into a working area.
///
/// With a per-frame command the command's raw output is streamed to the
/// given sink, one invocation per frame in order.
pub struct ExtractFramesUseCase {
    orchestrator: PipelineOrchestrator,
}

impl ExtractFramesUseCase {
    pub fn new(orchestrator: PipelineOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.orchestrator.cancel_handle()
    }

    pub fn execute(
        &mut self,
        input: InputSource,
        rate: SampleRate,
        area: WorkingAreaPolicy,
        per_frame: Option<(FrameCommand, OutputSink)>,
    ) -> Result<RunReport, PipelineError> {
        log::info!("Sampling {input} at {rate} fps");
        let spec = PipelineSpec::extract_frames(input, rate, area, per_frame)?;
        self.orchestrator.run(&spec)
    }
}
