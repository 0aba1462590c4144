use std::ffi::OsString;
use std::process::Command;

use crate::shared::constants::{FFMPEG_BINARY, FRAME_START_NUMBER};
use crate::shared::crop_area::CropArea;
use crate::shared::sample_rate::SampleRate;
use crate::stage::domain::media_engine::{Endpoint, MediaEngine, StageInvocation};

const PIPE_INPUT: &str = "pipe:0";
const PIPE_OUTPUT: &str = "pipe:1";

/// [`MediaEngine`] backed by the `ffmpeg` command-line tool.
///
/// Piped video travels as lossless raw frames in a NUT container, which
/// carries dimensions and timing so the next stage can decode it.
#[derive(Clone, Debug)]
pub struct FfmpegEngine {
    binary: OsString,
}

impl FfmpegEngine {
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn base_command(&self, invocation: &StageInvocation<'_>) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("-hide_banner");
        command
            .arg("-loglevel")
            .arg(if invocation.verbose { "info" } else { "error" });
        if invocation.input != Endpoint::Pipe {
            command.arg("-nostdin");
        }
        if let Some(feed) = invocation.progress {
            command.arg("-progress").arg(feed).arg("-nostats");
        }
        command.arg("-i");
        match invocation.input {
            Endpoint::Path(path) => command.arg(path),
            Endpoint::Pipe => command.arg(PIPE_INPUT),
        };
        command
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new(FFMPEG_BINARY)
    }
}

impl MediaEngine for FfmpegEngine {
    fn crop(&self, area: &CropArea, invocation: &StageInvocation<'_>) -> Command {
        let mut command = self.base_command(invocation);
        command.arg("-vf").arg(area.to_filter());
        match invocation.output {
            Endpoint::Pipe => {
                command
                    .arg("-an")
                    .args(["-c:v", "rawvideo", "-f", "nut"])
                    .arg(PIPE_OUTPUT);
            }
            Endpoint::Path(path) => {
                command.args(["-c:a", "copy", "-y"]).arg(path);
            }
        }
        command
    }

    fn extract_frames(&self, rate: &SampleRate, invocation: &StageInvocation<'_>) -> Command {
        let mut command = self.base_command(invocation);
        command
            .arg("-an")
            .arg("-vf")
            .arg(rate.to_filter())
            .arg("-start_number")
            .arg(FRAME_START_NUMBER.to_string())
            .arg("-y");
        match invocation.output {
            Endpoint::Path(pattern) => command.arg(pattern),
            // Images cannot go to a pipe as separate files; the orchestrator
            // never asks for this.
            Endpoint::Pipe => command.args(["-f", "image2pipe", PIPE_OUTPUT]),
        };
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn area() -> CropArea {
        "600x50+210+498".parse().unwrap()
    }

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn test_crop_file_to_pipe_with_progress() {
        let engine = FfmpegEngine::default();
        let invocation = StageInvocation {
            input: Endpoint::Path(Path::new("in.mkv")),
            output: Endpoint::Pipe,
            progress: Some(Path::new("/tmp/s/01-crop.progress")),
            verbose: false,
        };
        let command = engine.crop(&area(), &invocation);
        let args = args(&command);

        assert_eq!(command.get_program(), "ffmpeg");
        assert_eq!(
            args,
            [
                "-hide_banner",
                "-loglevel",
                "error",
                "-nostdin",
                "-progress",
                "/tmp/s/01-crop.progress",
                "-nostats",
                "-i",
                "in.mkv",
                "-vf",
                "crop=600:50:210:498",
                "-an",
                "-c:v",
                "rawvideo",
                "-f",
                "nut",
                "pipe:1",
            ]
        );
    }

    #[test]
    fn test_stdin_input_keeps_stdin_and_verbose_logs() {
        let engine = FfmpegEngine::new("/opt/ffmpeg/bin/ffmpeg");
        let invocation = StageInvocation {
            input: Endpoint::Pipe,
            output: Endpoint::Path(Path::new("out.mkv")),
            progress: None,
            verbose: true,
        };
        let command = engine.crop(&area(), &invocation);
        let args = args(&command);

        assert_eq!(command.get_program(), "/opt/ffmpeg/bin/ffmpeg");
        assert!(position(&args, "-nostdin").is_none());
        assert!(position(&args, "-progress").is_none());
        assert_eq!(args[position(&args, "-loglevel").unwrap() + 1], "info");
        assert_eq!(args[position(&args, "-i").unwrap() + 1], "pipe:0");
        assert_eq!(args.last().unwrap(), "out.mkv");
    }

    #[test]
    fn test_extract_frames_numbers_from_one() {
        let engine = FfmpegEngine::default();
        let rate: SampleRate = "0.5".parse().unwrap();
        let invocation = StageInvocation {
            input: Endpoint::Pipe,
            output: Endpoint::Path(Path::new("/tmp/f/%06d.png")),
            progress: None,
            verbose: false,
        };
        let args = args(&engine.extract_frames(&rate, &invocation));

        assert_eq!(args[position(&args, "-vf").unwrap() + 1], "fps=0.5");
        assert_eq!(args[position(&args, "-start_number").unwrap() + 1], "1");
        assert_eq!(args.last().unwrap(), "/tmp/f/%06d.png");
    }
}
