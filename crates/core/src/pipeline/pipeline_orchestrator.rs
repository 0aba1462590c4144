use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::{ChildStdout, Stdio};
use std::thread;

use crate::lifecycle::resource_manager::ResourceManager;
use crate::lifecycle::working_area::WorkingArea;
use crate::progress::domain::progress_tracker::ProgressScale;
use crate::progress::infrastructure::progress_board::ProgressBoard;
use crate::progress::infrastructure::progress_monitor::ProgressMonitor;
use crate::shared::config_error::ConfigError;
use crate::stage::domain::duration_probe::DurationProbe;
use crate::stage::domain::media_engine::{Endpoint, MediaEngine, StageInvocation};
use crate::stage::domain::ocr_engine::OcrEngine;
use crate::stage::domain::pipeline_spec::PipelineSpec;
use crate::stage::domain::stage_definition::{
    FrameCommand, StageDefinition, StageInput, StageKind, StageOutput,
};
use crate::stage::domain::stage_error::StageError;
use crate::stage::infrastructure::process_group::ProcessGroup;
use crate::stage::infrastructure::stage_handle::StageHandle;
use crate::transcript::transcript_reducer::TranscriptWriter;

use super::interrupt_listener::{CancelHandle, InterruptListener};
use super::orchestrator_config::{EngineConfig, OrchestratorConfig};
use super::pipeline_error::PipelineError;
use super::run_state::RunState;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Frames found in the working area after extraction.
    pub frames: usize,
    /// Transcript lines written. Zero when output is copied verbatim.
    pub lines_written: usize,
    /// Frame directory left behind for the caller, if any.
    pub working_area: Option<PathBuf>,
    /// Output file written, if the output was not stdout.
    pub output: Option<PathBuf>,
}

struct RunningStage {
    handle: StageHandle,
    monitor: Option<ProgressMonitor>,
}

enum FrameSink {
    Transcript(TranscriptWriter<Box<dyn Write>>),
    Raw(Box<dyn Write>),
}

impl FrameSink {
    fn consume<R: Read>(&mut self, mut output: R) -> io::Result<()> {
        match self {
            Self::Transcript(writer) => {
                for line in BufReader::new(output).split(b'\n') {
                    writer.push(&String::from_utf8_lossy(&line?))?;
                }
                Ok(())
            }
            Self::Raw(sink) => io::copy(&mut output, sink).map(|_| ()),
        }
    }

    fn finish(self) -> io::Result<usize> {
        match self {
            Self::Transcript(writer) => writer.finish(),
            Self::Raw(mut sink) => sink.flush().map(|_| 0),
        }
    }
}

/// Runs a [`PipelineSpec`] end to end.
///
/// Streaming stages run concurrently, connected by OS pipes, inside one
/// process group. The per-frame stage then runs once per frame in filename
/// order. Every resource the run creates is released before `run` returns,
/// whatever the outcome. Single-use: a second `run` is rejected.
pub struct PipelineOrchestrator {
    media: Box<dyn MediaEngine>,
    ocr: Box<dyn OcrEngine>,
    probe: Box<dyn DurationProbe>,
    config: OrchestratorConfig,
    group: ProcessGroup,
    state: RunState,
}

impl PipelineOrchestrator {
    pub fn new(
        media: Box<dyn MediaEngine>,
        ocr: Box<dyn OcrEngine>,
        probe: Box<dyn DurationProbe>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            media,
            ocr,
            probe,
            config,
            group: ProcessGroup::new(),
            state: RunState::Idle,
        }
    }

    /// Orchestrator using ffmpeg, ffprobe and tesseract from `engines`.
    pub fn with_engines(engines: &EngineConfig, config: OrchestratorConfig) -> Self {
        Self::new(
            Box::new(engines.media_engine()),
            Box::new(engines.ocr_engine()),
            Box::new(engines.duration_probe()),
            config,
        )
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.group.clone())
    }

    pub fn run(&mut self, spec: &PipelineSpec) -> Result<RunReport, PipelineError> {
        self.advance(RunState::ConfiguringStages)?;

        // Must precede any allocation.
        let listener = self.install_listener();
        if let Err(e) = spec.validate_inputs() {
            return self.conclude(Err(e.into()), None);
        }
        let mut resources = match ResourceManager::new(self.config.scratch_root.as_deref()) {
            Ok(resources) => resources,
            Err(e) => return self.conclude(Err(e.into()), None),
        };

        let outcome = self.execute(spec, &mut resources);
        let report = self.conclude(outcome, Some(resources));
        drop(listener);
        report
    }

    fn install_listener(&self) -> Option<InterruptListener> {
        if !self.config.handle_signals {
            return None;
        }
        match InterruptListener::install(self.cancel_handle()) {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::warn!("Signal handling unavailable: {e}");
                None
            }
        }
    }

    fn advance(&mut self, next: RunState) -> Result<(), PipelineError> {
        self.state = self.state.transition(next)?;
        Ok(())
    }

    /// Enters the terminal state, releases resources and enters `CleanedUp`.
    fn conclude(
        &mut self,
        outcome: Result<RunReport, PipelineError>,
        resources: Option<ResourceManager>,
    ) -> Result<RunReport, PipelineError> {
        let terminal = match &outcome {
            Ok(_) => RunState::Succeeded,
            Err(e) if e.is_interrupted() => RunState::Interrupted,
            Err(_) => RunState::Failed,
        };
        self.advance(terminal)?;

        let released = resources.map_or(Ok(()), ResourceManager::release);
        self.advance(RunState::CleanedUp)?;

        match (outcome, released) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                log::warn!("Cleanup after failure also failed: {cleanup}");
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        spec: &PipelineSpec,
        resources: &mut ResourceManager,
    ) -> Result<RunReport, PipelineError> {
        let area = spec
            .frame_directory()
            .map(|policy| resources.working_area(policy))
            .transpose()?;
        let scale = self.progress_scale(spec.source());
        if self.group.is_cancelled() {
            return Err(PipelineError::Interrupted);
        }

        self.advance(RunState::Running)?;
        self.run_streaming(spec.streaming_stages(), area.as_ref(), scale, resources)?;

        let output = match spec.output() {
            StageOutput::File(path) => Some(path.clone()),
            _ => None,
        };
        let Some(area) = area else {
            return Ok(RunReport {
                frames: 0,
                lines_written: 0,
                working_area: None,
                output,
            });
        };

        let frames = area.frames().map_err(|e| {
            PipelineError::io(format!("cannot list frames in {}", area.path().display()), e)
        })?;
        if frames.is_empty() {
            return Err(PipelineError::NoFrames(area.path().to_path_buf()));
        }
        log::info!("Extracted {} frames", frames.len());

        let lines_written = match spec.per_frame_stage() {
            Some(stage) => self.run_per_frame(stage, &frames, spec.output())?,
            None => 0,
        };

        let working_area = (!area.is_ephemeral()).then(|| area.path().to_path_buf());
        if let Err(e) = area.close() {
            log::warn!("Failed to remove frame directory: {e}");
        }
        Ok(RunReport {
            frames: frames.len(),
            lines_written,
            working_area,
            output,
        })
    }

    fn progress_scale(&self, source: &StageInput) -> ProgressScale {
        match source {
            StageInput::File(path) if self.config.shows_progress() => {
                ProgressScale::from_probe(self.probe.probe(path))
            }
            _ => ProgressScale::Spinner,
        }
    }

    /// Spawns the connected streaming stages and waits for all of them.
    fn run_streaming(
        &self,
        stages: &[StageDefinition],
        area: Option<&WorkingArea>,
        scale: ProgressScale,
        resources: &mut ResourceManager,
    ) -> Result<(), PipelineError> {
        let board = if self.config.shows_progress() {
            let labels = stages.iter().map(|s| s.label().to_string()).collect();
            let board = ProgressBoard::spawn(labels, io::stderr())
                .map_err(|e| PipelineError::io("cannot start progress display", e))?;
            Some(board)
        } else {
            None
        };

        let mut running = Vec::with_capacity(stages.len());
        let spawned = self.spawn_streaming(stages, area, scale, board.as_ref(), resources, &mut running);
        if spawned.is_err() {
            self.group.abort();
        }

        let failure = match spawned {
            Err(e) => {
                self.reap(running);
                Some(e)
            }
            Ok(()) => self.reap(running).map(PipelineError::from),
        };
        if let Some(board) = board {
            board.finish();
        }

        match failure {
            Some(e) => Err(e),
            None if self.group.is_cancelled() => Err(PipelineError::Interrupted),
            None => Ok(()),
        }
    }

    /// Waits for every stage and returns the failure that caused the others.
    ///
    /// Stages are reaped in the order they exit. The first failure aborts the
    /// rest of the group. A stage that died on a broken pipe only lost its
    /// reader, so any other failure is reported in its place.
    fn reap(&self, running: Vec<RunningStage>) -> Option<StageError> {
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        let mut monitors = Vec::with_capacity(running.len());
        let mut failures = Vec::new();

        thread::scope(|scope| {
            for stage in running {
                monitors.push(stage.monitor);
                let done = done_tx.clone();
                let handle = stage.handle;
                scope.spawn(move || {
                    let _ = done.send(handle.wait());
                });
            }
            drop(done_tx);

            for result in done_rx.iter() {
                if let Err(e) = result {
                    if failures.is_empty() {
                        self.group.abort();
                    }
                    log::debug!("Stage failure: {e}");
                    failures.push(e);
                }
            }
        });
        for monitor in monitors.into_iter().flatten() {
            monitor.finish();
        }

        if failures.is_empty() {
            return None;
        }
        let cause = failures.iter().position(|e| !e.is_broken_pipe()).unwrap_or(0);
        Some(failures.swap_remove(cause))
    }

    fn spawn_streaming(
        &self,
        stages: &[StageDefinition],
        area: Option<&WorkingArea>,
        scale: ProgressScale,
        board: Option<&ProgressBoard>,
        resources: &mut ResourceManager,
        running: &mut Vec<RunningStage>,
    ) -> Result<(), PipelineError> {
        let frame_pattern = area.map(WorkingArea::frame_pattern);
        let mut upstream: Option<ChildStdout> = None;

        for (index, stage) in stages.iter().enumerate() {
            let label = stage.label();
            let monitor = match board.and_then(|b| b.slot(index)) {
                Some(slot) => {
                    let feed = resources.progress_feed(label, scale)?;
                    let monitor = ProgressMonitor::start(feed, slot).map_err(|e| {
                        PipelineError::io(format!("cannot attach progress feed for {label}"), e)
                    })?;
                    Some(monitor)
                }
                None => None,
            };

            let input = match &stage.input {
                StageInput::File(path) => Endpoint::Path(path),
                StageInput::Stdin | StageInput::Upstream => Endpoint::Pipe,
            };
            let output = match &stage.output {
                StageOutput::File(path) => Endpoint::Path(path),
                StageOutput::FrameDirectory(_) => {
                    Endpoint::Path(frame_pattern.as_deref().ok_or_else(|| {
                        ConfigError::InvalidPipeline("no working area for frames".to_string())
                    })?)
                }
                StageOutput::Stdout | StageOutput::Downstream => Endpoint::Pipe,
            };
            let invocation = StageInvocation {
                input,
                output,
                progress: monitor.as_ref().and_then(ProgressMonitor::feed_path),
                verbose: self.config.verbose,
            };
            let mut command = match &stage.kind {
                StageKind::Crop(crop) => self.media.crop(crop, &invocation),
                StageKind::ExtractFrames(rate) => self.media.extract_frames(rate, &invocation),
                StageKind::PerFrame { .. } => {
                    return Err(ConfigError::InvalidPipeline(
                        "per-frame stage cannot stream".to_string(),
                    )
                    .into())
                }
            };

            match &stage.input {
                StageInput::Upstream => {
                    let pipe = upstream
                        .take()
                        .ok_or_else(|| StageError::NoOutput {
                            stage: stages[index - 1].label().to_string(),
                        })?;
                    command.stdin(Stdio::from(pipe));
                }
                StageInput::Stdin => {
                    command.stdin(Stdio::inherit());
                }
                StageInput::File(_) => {
                    command.stdin(Stdio::null());
                }
            }
            match &stage.output {
                StageOutput::Downstream => command.stdout(Stdio::piped()),
                StageOutput::Stdout => command.stdout(Stdio::inherit()),
                StageOutput::File(_) | StageOutput::FrameDirectory(_) => {
                    command.stdout(Stdio::null())
                }
            };

            let mut handle = self.group.spawn(label, &mut command)?;
            if stage.output == StageOutput::Downstream {
                upstream = handle.take_stdout();
            }
            running.push(RunningStage { handle, monitor });
        }
        Ok(())
    }

    /// Runs the per-frame command over every frame, in order.
    fn run_per_frame(
        &mut self,
        stage: &StageDefinition,
        frames: &[PathBuf],
        output: &StageOutput,
    ) -> Result<usize, PipelineError> {
        let StageKind::PerFrame { command, dedup } = &stage.kind else {
            return Err(ConfigError::InvalidPipeline("expected a per-frame stage".to_string()).into());
        };
        let label = stage.label();

        let sink: Box<dyn Write> = match output {
            StageOutput::File(path) => {
                let file = File::create(path).map_err(|e| {
                    PipelineError::io(format!("cannot create {}", path.display()), e)
                })?;
                Box::new(BufWriter::new(file))
            }
            _ => Box::new(io::stdout().lock()),
        };
        let mut sink = if *dedup {
            FrameSink::Transcript(TranscriptWriter::new(sink, self.config.tee.take()))
        } else {
            FrameSink::Raw(sink)
        };

        for (index, frame) in frames.iter().enumerate() {
            if self.group.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }
            log::debug!("{label} {}/{}: {}", index + 1, frames.len(), frame.display());

            let mut process = match command {
                FrameCommand::Ocr(options) => self.ocr.recognize(frame, options),
                FrameCommand::Exec(template) => template.command(frame),
            };
            process.stdin(Stdio::null()).stdout(Stdio::piped());
            if matches!(command, FrameCommand::Ocr(_)) && !self.config.verbose {
                process.stderr(Stdio::null());
            }

            let mut handle = self.group.spawn(label, &mut process)?;
            let stdout = handle.take_stdout().ok_or_else(|| StageError::NoOutput {
                stage: label.to_string(),
            })?;
            let consumed = sink.consume(stdout);
            handle.wait()?;
            consumed.map_err(|e| PipelineError::io("cannot write output", e))?;
        }

        sink.finish()
            .map_err(|e| PipelineError::io("cannot write output", e))
    }
}
