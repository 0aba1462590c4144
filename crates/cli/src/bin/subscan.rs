use std::io::{self, Write};

use clap::Parser;

use subscan_cli::args::{DisplayArgs, EngineArgs};
use subscan_cli::exit::{self, EXIT_NO_TEXT, EXIT_SUCCESS};
use subscan_cli::logging;
use subscan_core::pipeline::pipeline_error::PipelineError;
use subscan_core::pipeline::pipeline_orchestrator::PipelineOrchestrator;
use subscan_core::pipeline::scan_subtitles_use_case::ScanSubtitlesUseCase;
use subscan_core::shared::constants::{DEFAULT_OCR_LANGUAGE, DEFAULT_SAMPLE_RATE};
use subscan_core::shared::crop_area::CropArea;
use subscan_core::shared::endpoint::{InputSource, OutputSink};
use subscan_core::shared::sample_rate::SampleRate;
use subscan_core::stage::domain::ocr_engine::{OcrMode, OcrOptions};

/// Extract hardcoded subtitles from a video as a plain-text transcript.
///
/// Crops the subtitle band, samples frames from it, runs OCR on each frame
/// and drops blank lines and consecutive repeats.
#[derive(Parser)]
#[command(name = "subscan", version)]
struct Cli {
    /// Input video, or `-` for stdin.
    input: String,

    /// Subtitle band, as WxH+X+Y.
    #[arg(short, long)]
    area: CropArea,

    /// Frames to sample per second.
    #[arg(short, long, default_value = DEFAULT_SAMPLE_RATE)]
    rate: SampleRate,

    /// Transcript file, or `-` for stdout (the default).
    #[arg(short, long)]
    output: Option<String>,

    /// OCR languages, e.g. `eng` or `eng+jpn`.
    #[arg(short, long = "lang", default_value = DEFAULT_OCR_LANGUAGE)]
    languages: String,

    /// Treat each frame as a single line of text.
    #[arg(long)]
    fast: bool,

    /// Also print transcript lines to stderr as they are found.
    #[arg(long)]
    tee: bool,

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
    let mode = if cli.fast {
        OcrMode::Fast
    } else {
        OcrMode::Accurate
    };
    let ocr = OcrOptions::new(&cli.languages, mode)?;

    let mut config = cli.display.orchestrator_config();
    if cli.tee {
        config.tee = Some(Box::new(io::stderr()) as Box<dyn Write + Send>);
    }
    let orchestrator = PipelineOrchestrator::with_engines(&cli.engines.engine_config(), config);
    let mut use_case = ScanSubtitlesUseCase::new(orchestrator);
    let report = use_case.execute(
        InputSource::from_arg(&cli.input),
        cli.area,
        cli.rate,
        ocr,
        OutputSink::from_arg(cli.output.as_deref()),
    )?;

    if report.lines_written == 0 {
        eprintln!("No textual content found in {} frames", report.frames);
        return Ok(EXIT_NO_TEXT);
    }
    if let Some(path) = report.output {
        eprintln!("Transcript written to {}", path.display());
    }
    Ok(EXIT_SUCCESS)
}
