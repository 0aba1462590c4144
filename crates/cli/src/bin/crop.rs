use clap::Parser;

use subscan_cli::args::{DisplayArgs, EngineArgs};
use subscan_cli::exit::{self, EXIT_SUCCESS};
use subscan_cli::logging;
use subscan_core::pipeline::crop_video_use_case::CropVideoUseCase;
use subscan_core::pipeline::pipeline_error::PipelineError;
use subscan_core::pipeline::pipeline_orchestrator::PipelineOrchestrator;
use subscan_core::shared::crop_area::CropArea;
use subscan_core::shared::endpoint::{InputSource, OutputSink};

/// Crop a rectangle out of a video.
#[derive(Parser)]
#[command(name = "crop", version)]
struct Cli {
    /// Input video, or `-` for stdin.
    input: String,

    /// Rectangle to keep, as WxH+X+Y.
    #[arg(short, long)]
    area: CropArea,

    /// Output video, or `-` for stdout (the default).
    #[arg(short, long)]
    output: Option<String>,

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
    let orchestrator = PipelineOrchestrator::with_engines(
        &cli.engines.engine_config(),
        cli.display.orchestrator_config(),
    );
    let mut use_case = CropVideoUseCase::new(orchestrator);
    let report = use_case.execute(
        InputSource::from_arg(&cli.input),
        cli.area,
        OutputSink::from_arg(cli.output.as_deref()),
    )?;

    if let Some(path) = report.output {
        eprintln!("Output written to {}", path.display());
    }
    Ok(EXIT_SUCCESS)
}
