use std::process::{Child, ChildStdout};

use crate::stage::domain::stage_error::StageError;

use super::process_group::ProcessGroup;

/// A running stage process and its group membership.
///
/// Dropping a handle that was never waited on kills and reaps the child,
/// so an early return cannot leave a stage running.
#[derive(Debug)]
pub struct StageHandle {
    label: String,
    child: Child,
    group: ProcessGroup,
    reaped: bool,
}

impl StageHandle {
    pub(crate) fn new(label: &str, child: Child, group: ProcessGroup) -> Self {
        Self {
            label: label.to_string(),
            child,
            group,
            reaped: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Waits for the process to exit.
    ///
    /// A non-zero exit is a [`StageError::Failed`], unless the run was
    /// cancelled, in which case it is reported as [`StageError::Interrupted`].
    pub fn wait(mut self) -> Result<(), StageError> {
        let status = self.child.wait().map_err(|source| StageError::Wait {
            stage: self.label.clone(),
            source,
        })?;
        self.reaped = true;
        self.group.release(self.child.id());

        if status.success() {
            log::info!("{} finished", self.label);
            return Ok(());
        }
        if self.group.is_cancelled() {
            log::debug!("{} stopped by cancellation ({status})", self.label);
            return Err(StageError::Interrupted);
        }
        Err(StageError::Failed {
            stage: self.label.clone(),
            status,
        })
    }
}

impl Drop for StageHandle {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        log::debug!("Killing unfinished {} (pid {})", self.label, self.child.id());
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.group.release(self.child.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::process::{Command, Stdio};

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script).stdin(Stdio::null());
        command
    }

    #[test]
    fn test_success_and_stdout() {
        let group = ProcessGroup::new();
        let mut command = sh("echo hello");
        command.stdout(Stdio::piped());
        let mut handle = group.spawn("ocr", &mut command).unwrap();
        let mut text = String::new();
        handle.take_stdout().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello\n");
        assert_eq!(handle.label(), "ocr");
        handle.wait().unwrap();
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let group = ProcessGroup::new();
        let handle = group.spawn("crop", &mut sh("exit 3")).unwrap();
        match handle.wait() {
            Err(StageError::Failed { stage, status }) => {
                assert_eq!(stage, "crop");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_drop_kills_and_releases() {
        let group = ProcessGroup::new();
        let handle = group.spawn("frames", &mut sh("sleep 30")).unwrap();
        assert_eq!(group.live_members(), 1);
        drop(handle);
        assert_eq!(group.live_members(), 0);
    }
}
