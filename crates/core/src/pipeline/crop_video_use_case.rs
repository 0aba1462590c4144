use crate::shared::crop_area::CropArea;
use crate::shared::endpoint::{InputSource, OutputSink};
use crate::stage::domain::pipeline_spec::PipelineSpec;

use super::interrupt_listener::CancelHandle;
use super::pipeline_error::PipelineError;
use super::pipeline_orchestrator::{PipelineOrchestrator, RunReport};

/// Crops a video to a rectangle, writing the result to a file or stdout.
pub struct CropVideoUseCase {
    orchestrator: PipelineOrchestrator,
}

impl CropVideoUseCase {
    pub fn new(orchestrator: PipelineOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.orchestrator.cancel_handle()
    }

    pub fn execute(
        &mut self,
        input: InputSource,
        area: CropArea,
        output: OutputSink,
    ) -> Result<RunReport, PipelineError> {
        log::info!("Cropping {input} to {area}");
        let spec = PipelineSpec::crop(input, area, output)?;
        self.orchestrator.run(&spec)
    }
}
