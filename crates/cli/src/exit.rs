use std::process;

use clap::CommandFactory;

use subscan_core::pipeline::pipeline_error::{PipelineError, EXIT_USAGE};

pub const EXIT_SUCCESS: i32 = 0;
pub use subscan_core::pipeline::pipeline_error::{EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_NO_TEXT};

/// Maps a run result to a process exit code, reporting errors on stderr.
///
/// Usage errors are followed by the command's usage line.
pub fn exit_code<C: CommandFactory>(result: Result<i32, PipelineError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            let code = e.exit_code();
            if e.is_interrupted() {
                eprintln!("Interrupted");
            } else {
                eprintln!("Error: {e}");
            }
            if code == EXIT_USAGE {
                eprintln!("\n{}", C::command().render_usage());
            }
            code
        }
    }
}

/// Exits the process with the code for `result`.
pub fn finish<C: CommandFactory>(result: Result<i32, PipelineError>) -> ! {
    process::exit(exit_code::<C>(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;
    use subscan_core::shared::config_error::ConfigError;

    #[derive(Parser)]
    struct TestCli {
        input: String,
    }

    #[rstest]
    #[case::success(Ok(EXIT_SUCCESS), 0)]
    #[case::no_text(Ok(EXIT_NO_TEXT), 3)]
    #[case::usage(Err(PipelineError::Config(ConfigError::InvalidRate("0".into()))), 2)]
    #[case::no_frames(Err(PipelineError::NoFrames("frames".into())), 1)]
    #[case::interrupted(Err(PipelineError::Interrupted), 130)]
    fn test_exit_codes(#[case] result: Result<i32, PipelineError>, #[case] code: i32) {
        assert_eq!(exit_code::<TestCli>(result), code);
    }

    #[test]
    fn test_exported_codes() {
        assert_eq!(EXIT_FAILURE, 1);
        assert_eq!(EXIT_INTERRUPTED, 130);
    }
}
