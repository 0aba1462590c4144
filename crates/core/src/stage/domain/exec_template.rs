use std::path::Path;
use std::process::Command;

use crate::shared::config_error::ConfigError;
use crate::shared::constants::EXEC_PLACEHOLDER;

/// A shell command run once per frame, with `{}` replaced by the frame path.
///
/// Substitution is literal: the path is not quoted, so templates that need
/// quoting must supply it themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecTemplate {
    template: String,
}

impl ExecTemplate {
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        if !template.contains(EXEC_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(template.to_string()));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, frame: &Path) -> String {
        self.template
            .replace(EXEC_PLACEHOLDER, &frame.to_string_lossy())
    }

    pub fn command(&self, frame: &Path) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(self.render(frame));
        command
    }
}
