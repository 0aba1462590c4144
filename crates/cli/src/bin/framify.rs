use std::path::PathBuf;

use clap::Parser;

use subscan_cli::args::{DisplayArgs, EngineArgs};
use subscan_cli::exit::{self, EXIT_SUCCESS};
use subscan_cli::logging;
use subscan_core::lifecycle::working_area::WorkingAreaPolicy;
use subscan_core::pipeline::extract_frames_use_case::ExtractFramesUseCase;
use subscan_core::pipeline::pipeline_error::PipelineError;
use subscan_core::pipeline::pipeline_orchestrator::PipelineOrchestrator;
use subscan_core::shared::constants::DEFAULT_SAMPLE_RATE;
use subscan_core::shared::endpoint::{InputSource, OutputSink};
use subscan_core::shared::sample_rate::SampleRate;
use subscan_core::stage::domain::exec_template::ExecTemplate;
use subscan_core::stage::domain::stage_definition::FrameCommand;

/// Sample frames from a video as numbered PNG images.
///
/// Frames are written to `<input stem>_frames` (or `frames` for stdin)
/// unless a directory is given. With `--exec`, the command runs once per
/// frame and its output is streamed to stdout.
#[derive(Parser)]
#[command(name = "framify", version)]
struct Cli {
    /// Input video, or `-` for stdin.
    input: String,

    /// Frames to sample per second.
    #[arg(short, long, default_value = DEFAULT_SAMPLE_RATE)]
    rate: SampleRate,

    /// Directory for the frames. Must be empty or not exist yet.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stage frames in a temporary directory removed after the run.
    #[arg(long, requires = "exec", conflicts_with = "output")]
    temp: bool,

    /// Command run for every frame; `{}` is replaced by the frame path.
    #[arg(short = 'x', long)]
    exec: Option<String>,

    #[command(flatten)]
    display: DisplayArgs,

    #[command(flatten)]
    engines: EngineArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.display.verbose);
    exit::finish::<Cli>(run(cli));
}

fn run(cli: Cli) -> Result<i32, PipelineError> {
    log::debug!("Using engines {:?}", cli.engines);
    let input = InputSource::from_arg(&cli.input);
    let exec = cli.exec.as_deref().map(ExecTemplate::new).transpose()?;
    let ephemeral = cli.temp || (exec.is_some() && cli.output.is_none());
    let area = WorkingAreaPolicy::select(&input, cli.output, ephemeral);
    let per_frame = exec.map(|template| (FrameCommand::Exec(template), OutputSink::Stdout));

    let orchestrator = PipelineOrchestrator::with_engines(
        &cli.engines.engine_config(),
        cli.display.orchestrator_config(),
    );
    let mut use_case = ExtractFramesUseCase::new(orchestrator);
    let report = use_case.execute(input, cli.rate, area, per_frame)?;

    if let Some(path) = report.working_area {
        eprintln!("{} frames written to {}", report.frames, path.display());
    }
    Ok(EXIT_SUCCESS)
}
