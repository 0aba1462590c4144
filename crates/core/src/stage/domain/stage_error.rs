use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use thiserror::Error;

/// Exit code a shell reports for a child killed by SIGPIPE.
const SHELL_SIGPIPE_CODE: i32 = 128 + libc::SIGPIPE;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("failed to start {stage} ({program}): {source}")]
    Spawn {
        stage: String,
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {stage}: {source}")]
    Wait {
        stage: String,
        #[source]
        source: io::Error,
    },
    #[error("{stage} exited with {status}")]
    Failed { stage: String, status: ExitStatus },
    #[error("{stage} produced no readable output")]
    NoOutput { stage: String },
    #[error("interrupted")]
    Interrupted,
}

impl StageError {
    /// True when the stage died writing to a reader that had already gone.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Failed { status, .. } => {
                status.signal() == Some(libc::SIGPIPE) || status.code() == Some(SHELL_SIGPIPE_CODE)
            }
            _ => false,
        }
    }
}
