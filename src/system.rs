use thiserror::Error;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command timed out after {timeout_secs}s: {cmd}")]
    Timeout { cmd: String, timeout_secs: u64 },
    #[error("failed to execute command {cmd}: {source}")]
    Io { cmd: String, source: std::io::Error },
    #[error("command {cmd} exited with status {status}: {stderr}")]
    Failed {
        cmd: String,
        status: i32,
        stderr: String,
    },
}

pub async fn run_cmd(
    cmd: &str,
    args: &[&str],
    timeout_secs: u64,
) -> Result<CommandOutput, CommandError> {
    let mut child = Command::new(cmd);
    child.args(args).kill_on_drop(true);

    let output = timeout(Duration::from_secs(timeout_secs), child.output())
        .await
        .map_err(|_| CommandError::Timeout {
            cmd: cmd.to_string(),
            timeout_secs,
        })?
        .map_err(|source| CommandError::Io {
            cmd: cmd.to_string(),
            source,
        })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status.code().unwrap_or(-1),
    })
}

/// Like [`run_cmd`] but treats a non-zero exit status as an error.
pub async fn run_cmd_checked(
    cmd: &str,
    args: &[&str],
    timeout_secs: u64,
) -> Result<CommandOutput, CommandError> {
    let output = run_cmd(cmd, args, timeout_secs).await?;
    if !output.success() {
        return Err(CommandError::Failed {
            cmd: cmd.to_string(),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{CommandError, run_cmd, run_cmd_checked};

    #[tokio::test]
    async fn missing_binary_reports_io_error() {
        let result = run_cmd("pc-doctor-definitely-missing-binary", &[], 2).await;
        assert!(matches!(result, Err(CommandError::Io { .. })));
    }

    #[tokio::test]
    async fn checked_run_rejects_non_zero_exit() {
        let result = run_cmd_checked("sh", &["-c", "echo boom >&2; exit 3"], 5).await;
        match result {
            Err(CommandError::Failed { status, stderr, .. }) => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected failed command, got {:?}", other),
        }
    }
}
