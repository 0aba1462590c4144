use std::fmt;

/// Lifecycle of one pipeline run.
///
/// Child processes exist only while `Running`. Every terminal state moves
/// on to `CleanedUp` once resources have been released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ConfiguringStages,
    Running,
    Succeeded,
    Failed,
    Interrupted,
    CleanedUp,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, ConfiguringStages)
                | (ConfiguringStages, Running | Failed | Interrupted)
                | (Running, Succeeded | Failed | Interrupted)
                | (Succeeded | Failed | Interrupted, CleanedUp)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Interrupted)
    }

    /// Moves to `next`, returning the rejected pair when the table forbids it.
    pub fn transition(self, next: RunState) -> Result<RunState, (RunState, RunState)> {
        if !self.can_transition_to(next) {
            return Err((self, next));
        }
        log::debug!("Run state {self} -> {next}");
        Ok(next)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ConfiguringStages => "configuring",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Interrupted => "interrupted",
            Self::CleanedUp => "cleaned-up",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use super::RunState::*;

    #[rstest]
    #[case::configure(Idle, ConfiguringStages)]
    #[case::start(ConfiguringStages, Running)]
    #[case::config_failure(ConfiguringStages, Failed)]
    #[case::interrupted_before_start(ConfiguringStages, Interrupted)]
    #[case::success(Running, Succeeded)]
    #[case::failure(Running, Failed)]
    #[case::interrupt(Running, Interrupted)]
    #[case::cleanup_after_success(Succeeded, CleanedUp)]
    #[case::cleanup_after_failure(Failed, CleanedUp)]
    #[case::cleanup_after_interrupt(Interrupted, CleanedUp)]
    fn test_allowed_transitions(#[case] from: RunState, #[case] to: RunState) {
        assert_eq!(from.transition(to), Ok(to));
    }

    #[rstest]
    #[case::skip_configuring(Idle, Running)]
    #[case::succeed_without_running(ConfiguringStages, Succeeded)]
    #[case::cleanup_while_running(Running, CleanedUp)]
    #[case::restart(CleanedUp, Idle)]
    #[case::rerun(Succeeded, Running)]
    #[case::cleanup_twice(CleanedUp, CleanedUp)]
    fn test_rejected_transitions(#[case] from: RunState, #[case] to: RunState) {
        assert_eq!(from.transition(to), Err((from, to)));
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = [
            Idle,
            ConfiguringStages,
            Running,
            Succeeded,
            Failed,
            Interrupted,
            CleanedUp,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
        assert_eq!(terminal, [Succeeded, Failed, Interrupted]);
    }
}
