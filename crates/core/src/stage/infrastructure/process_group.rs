use std::collections::HashSet;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::stage::domain::stage_error::StageError;

use super::stage_handle::StageHandle;

#[derive(Debug, Default)]
struct GroupState {
    leader: Option<i32>,
    members: HashSet<u32>,
    cancelled: bool,
}

/// Registry placing every process of one run into a dedicated process
/// group, so termination reaches intermediate stages and not only the
/// direct child.
///
/// The first live member becomes the group leader; later members join its
/// group. Once every member has been reaped the next spawn starts a fresh
/// group.
#[derive(Clone, Debug, Default)]
pub struct ProcessGroup {
    state: Arc<Mutex<GroupState>>,
}

impl ProcessGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `command` as a member of the group.
    ///
    /// Fails with [`StageError::Interrupted`] once the group has been
    /// terminated; no further stage may start after cancellation.
    pub fn spawn(&self, label: &str, command: &mut Command) -> Result<StageHandle, StageError> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(StageError::Interrupted);
        }
        command.process_group(state.leader.unwrap_or(0));
        log::debug!("Spawning {label}: {command:?}");
        let child = command.spawn().map_err(|source| StageError::Spawn {
            stage: label.to_string(),
            program: command.get_program().to_string_lossy().into_owned(),
            source,
        })?;
        let pid = child.id();
        if state.leader.is_none() {
            state.leader = Some(pid as i32);
        }
        state.members.insert(pid);
        drop(state);

        log::info!("Started {label} (pid {pid})");
        Ok(StageHandle::new(label, child, self.clone()))
    }

    /// Forgets a reaped member.
    pub(crate) fn release(&self, pid: u32) {
        let mut state = self.lock();
        state.members.remove(&pid);
        if state.members.is_empty() {
            state.leader = None;
        }
    }

    /// Sends `SIGTERM` to the whole group and marks the run cancelled.
    pub fn terminate(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        if let Some(leader) = state.leader {
            log::info!("Terminating process group {leader}");
            signal_group(leader);
        }
    }

    /// Sends `SIGTERM` to the group after a stage failed, without marking
    /// the run as cancelled.
    pub fn abort(&self) {
        let state = self.lock();
        if let Some(leader) = state.leader {
            log::debug!("Aborting process group {leader}");
            signal_group(leader);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    pub fn leader(&self) -> Option<i32> {
        self.lock().leader
    }

    pub fn live_members(&self) -> usize {
        self.lock().members.len()
    }

    fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn signal_group(pgid: i32) {
    // SAFETY: killpg has no memory-safety preconditions.
    if unsafe { libc::killpg(pgid, libc::SIGTERM) } != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            log::warn!("Failed to signal process group {pgid}: {err}");
        }
    }
}
