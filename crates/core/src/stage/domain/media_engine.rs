use std::path::Path;
use std::process::Command;

use crate::shared::crop_area::CropArea;
use crate::shared::sample_rate::SampleRate;

/// One side of a stage: a path the engine opens itself, or the process's
/// stdin/stdout which the orchestrator wires up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Path(&'a Path),
    Pipe,
}

/// Everything the engine needs to bind a transform to its endpoints.
#[derive(Clone, Copy, Debug)]
pub struct StageInvocation<'a> {
    pub input: Endpoint<'a>,
    pub output: Endpoint<'a>,
    /// FIFO the engine should write `key=value` progress records to.
    pub progress: Option<&'a Path>,
    pub verbose: bool,
}

/// Builds commands for the external media transform engine.
///
/// Implementations only construct commands; spawning, stdio wiring and
/// process-group membership belong to the orchestrator.
pub trait MediaEngine: Send + Sync {
    fn crop(&self, area: &CropArea, invocation: &StageInvocation<'_>) -> Command;

    /// Writes one image per sampled frame to the path pattern given as the
    /// invocation's output.
    fn extract_frames(&self, rate: &SampleRate, invocation: &StageInvocation<'_>) -> Command;
}
