use crate::shared::crop_area::CropArea;
use crate::shared::endpoint::{InputSource, OutputSink};
use crate::shared::sample_rate::SampleRate;
use crate::stage::domain::ocr_engine::OcrOptions;
use crate::stage::domain::pipeline_spec::PipelineSpec;

use super::interrupt_listener::CancelHandle;
use super::pipeline_error::PipelineError;
use super::pipeline_orchestrator::{PipelineOrchestrator, RunReport};

/// Recovers hardcoded subtitles: crop the subtitle band, sample frames into
/// an ephemeral area, OCR each frame and reduce the lines to a transcript.
pub struct ScanSubtitlesUseCase {
    orchestrator: PipelineOrchestrator,
}

impl ScanSubtitlesUseCase {
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
        rate: SampleRate,
        ocr: OcrOptions,
        output: OutputSink,
    ) -> Result<RunReport, PipelineError> {
        log::info!(
            "Scanning {input} (area {area}, {rate} fps, languages {})",
            ocr.language_arg()
        );
        let spec = PipelineSpec::scan(input, area, rate, ocr, output)?;
        let report = self.orchestrator.run(&spec)?;
        if report.lines_written == 0 {
            log::warn!("No text recognized in {} frames", report.frames);
        }
        Ok(report)
    }
}
