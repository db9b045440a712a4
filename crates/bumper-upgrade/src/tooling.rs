//! The `dotnet` CLI seam used by the code style upgrader.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use bumper_core::{CancellationToken, UpgradeError, UpgradeResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What happened when a tool was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRun {
    /// The tool is not installed; nothing was attempted.
    Unavailable,
    Succeeded,
    Failed { message: String },
}

pub trait DotNetTooling: Send + Sync {
    /// Run `dotnet format style` on `project`, fixing only `diagnostics`.
    fn format_style(
        &self,
        project: &Path,
        diagnostics: &[&str],
        cancel: &CancellationToken,
    ) -> UpgradeResult<ToolRun>;
}

/// Runs the real `dotnet` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct ProcessDotNetTooling {
    program: String,
}

impl ProcessDotNetTooling {
    pub fn new() -> Self {
        Self {
            program: "dotnet".into(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ProcessDotNetTooling {
    fn default() -> Self {
        Self::new()
    }
}

impl DotNetTooling for ProcessDotNetTooling {
    fn format_style(
        &self,
        project: &Path,
        diagnostics: &[&str],
        cancel: &CancellationToken,
    ) -> UpgradeResult<ToolRun> {
        cancel.check()?;
        let mut command = Command::new(&self.program);
        command
            .arg("format")
            .arg("style")
            .arg(project)
            .arg("--severity")
            .arg("info")
            .arg("--diagnostics")
            .args(diagnostics)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = project.parent() {
            command.current_dir(dir);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(program = %self.program, "dotnet is not installed");
                return Ok(ToolRun::Unavailable);
            }
            Err(e) => return Err(UpgradeError::io(project, e)),
        };

        // Drain stderr on its own thread so a chatty tool cannot block on a full pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buffer = String::new();
                let _ = pipe.read_to_string(&mut buffer);
                buffer
            })
        });

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(UpgradeError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(UpgradeError::io(project, e)),
            }
        };
        let output = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(ToolRun::Succeeded)
        } else {
            Ok(ToolRun::Failed {
                message: format!("{status}: {}", output.trim()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_unavailable() {
        let tooling = ProcessDotNetTooling::with_program("bumper-test-no-such-dotnet");
        let run = tooling
            .format_style(Path::new("App.csproj"), &["IDE0005"], &CancellationToken::new())
            .unwrap();
        assert_eq!(run, ToolRun::Unavailable);
    }

    #[test]
    fn cancelled_runs_do_not_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = ProcessDotNetTooling::with_program("bumper-test-no-such-dotnet").format_style(
            Path::new("App.csproj"),
            &[],
            &cancel,
        );
        assert!(matches!(result, Err(UpgradeError::Cancelled)));
    }
}
