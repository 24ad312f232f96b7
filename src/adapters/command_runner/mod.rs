// Command runner - Spawns engine executables and captures their output

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::EngineError;

/// Captured output of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs one engine executable with piped output
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
}

/// Longest stderr excerpt kept in an error
const STDERR_EXCERPT: usize = 2_000;

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run to completion; a non-zero exit becomes [`EngineError::NonZeroExit`]
    pub async fn run(&self, args: &[OsString]) -> Result<CommandOutput, EngineError> {
        debug!(
            program = %self.program.display(),
            args = ?args,
            "Running engine command"
        );

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(EngineError::NonZeroExit {
                program: self.program(),
                code: output.status.code(),
                stderr: excerpt(&stderr),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Keep the tail of stderr, where the engine puts the actual failure
fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_EXCERPT {
        return trimmed.to_string();
    }
    let tail: String = trimmed.chars().skip(count - STDERR_EXCERPT).collect();
    format!("...{}", tail)
}
